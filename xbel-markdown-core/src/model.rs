use serde::Serialize;

/// Title given to the tree root when the document does not name it.
pub const ROOT_PLACEHOLDER_TITLE: &str = "Bookmarks";

/// Normalized bookmark tree.
///
/// A `Folder` keeps its children in document order. A `Link` always has a
/// non-empty `target`; its `title` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BookmarkNode {
    Folder {
        title: String,
        children: Vec<BookmarkNode>,
    },
    Link {
        title: String,
        target: String,
    },
}

impl BookmarkNode {
    pub fn folder(title: impl Into<String>, children: Vec<BookmarkNode>) -> Self {
        BookmarkNode::Folder {
            title: title.into(),
            children,
        }
    }

    pub fn link(title: impl Into<String>, target: impl Into<String>) -> Self {
        BookmarkNode::Link {
            title: title.into(),
            target: target.into(),
        }
    }

    /// Number of folders in this subtree, including `self`.
    pub fn folder_count(&self) -> usize {
        match self {
            BookmarkNode::Folder { children, .. } => {
                1 + children.iter().map(BookmarkNode::folder_count).sum::<usize>()
            }
            BookmarkNode::Link { .. } => 0,
        }
    }

    /// Number of links in this subtree.
    pub fn link_count(&self) -> usize {
        match self {
            BookmarkNode::Folder { children, .. } => {
                children.iter().map(BookmarkNode::link_count).sum()
            }
            BookmarkNode::Link { .. } => 1,
        }
    }
}
