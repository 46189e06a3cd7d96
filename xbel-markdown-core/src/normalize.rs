//! Tree model adapter: raw parsed document → [`BookmarkNode`] tree.
//!
//! Bookmark exports are not schema-guaranteed, so nothing here fails:
//! - only the root gets [`ROOT_PLACEHOLDER_TITLE`] when untitled; nested
//!   folders without a title keep an empty one
//! - nested nodes with neither folders nor bookmarks are dropped
//! - bookmarks without a target are skipped

use tracing::debug;

use crate::contract::{RawBookmark, RawNode};
use crate::model::{BookmarkNode, ROOT_PLACEHOLDER_TITLE};

/// Normalize a parsed document into a tree whose root is always a folder.
///
/// If the document root is an untitled wrapper around exactly one folder and
/// nothing else, that folder becomes the root.
pub fn normalize(raw: &RawNode) -> BookmarkNode {
    let root = match raw.folders.as_slice() {
        [only] if raw.bookmarks.is_empty() && root_title(raw).is_none() => only,
        _ => raw,
    };

    let title = root_title(root)
        .unwrap_or(ROOT_PLACEHOLDER_TITLE)
        .to_string();
    BookmarkNode::Folder {
        title,
        children: normalize_children(root),
    }
}

fn root_title(raw: &RawNode) -> Option<&str> {
    raw.title.as_deref().filter(|t| !t.trim().is_empty())
}

fn normalize_children(raw: &RawNode) -> Vec<BookmarkNode> {
    let links = raw.bookmarks.iter().filter_map(normalize_bookmark);
    let folders = raw.folders.iter().filter_map(normalize_folder);
    links.chain(folders).collect()
}

fn normalize_folder(raw: &RawNode) -> Option<BookmarkNode> {
    if raw.is_bare() {
        debug!(title = ?raw.title, "Dropping folder with no folders or bookmarks");
        return None;
    }
    Some(BookmarkNode::Folder {
        title: raw.title.clone().unwrap_or_default(),
        children: normalize_children(raw),
    })
}

fn normalize_bookmark(raw: &RawBookmark) -> Option<BookmarkNode> {
    match raw.href.as_deref().map(str::trim) {
        Some(target) if !target.is_empty() => Some(BookmarkNode::Link {
            title: raw.title.clone().unwrap_or_default(),
            target: target.to_string(),
        }),
        _ => {
            debug!(title = ?raw.title, "Skipping bookmark without a target");
            None
        }
    }
}
