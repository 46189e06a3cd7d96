//! Markdown converter: one heading per folder, one line per link.
//!
//! ```text
//! # Bookmarks
//! [Example](https://example.com)
//!
//! ## Sub
//! [Nested](https://nested.example)
//! ```
//!
//! Heading weight is `depth + 1` and is never clamped, so folders nested past
//! six levels still get seven or more `#`s.

use crate::model::BookmarkNode;

/// Render `node` as Markdown, treating it as sitting at `depth`.
///
/// Lines are joined with `\n`; there is no trailing newline. Rendering is pure
/// and deterministic for a given tree.
pub fn render(node: &BookmarkNode, depth: usize) -> String {
    render_lines(node, depth).join("\n")
}

/// Render a whole tree starting at the top heading level.
pub fn render_document(root: &BookmarkNode) -> String {
    render(root, 0)
}

/// The individual output lines of [`render`].
pub fn render_lines(node: &BookmarkNode, depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    push_node(node, depth, &mut lines);
    lines
}

fn push_node(node: &BookmarkNode, depth: usize, lines: &mut Vec<String>) {
    match node {
        BookmarkNode::Link { title, target } => lines.push(link_line(title, target)),
        BookmarkNode::Folder { title, children } => {
            if depth > 0 {
                lines.push(String::new());
            }
            lines.push(format!("{} {}", "#".repeat(depth + 1), title));

            for child in children {
                if let BookmarkNode::Link { title, target } = child {
                    lines.push(link_line(title, target));
                }
            }
            for child in children {
                if matches!(child, BookmarkNode::Folder { .. }) {
                    push_node(child, depth + 1, lines);
                }
            }
        }
    }
}

fn link_line(title: &str, target: &str) -> String {
    let text = if title.is_empty() { target } else { title };
    format!("[{}]({})", text, target)
}
