//! XBEL parser built on `quick-xml`'s pull reader.
//!
//! Only the parts of XBEL the converter needs are kept: `<xbel>`/`<folder>`
//! nodes, `<bookmark href>` leaves and their `<title>`s. Everything else
//! (`<separator>`, `<alias>`, `<desc>`, `<info>` metadata, unknown elements)
//! is skipped together with its contents.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, error};

use crate::contract::{MarkupParser, RawBookmark, RawNode};
use crate::error::ParseError;

/// [`MarkupParser`] for XBEL bookmark exports.
#[derive(Debug, Clone, Copy, Default)]
pub struct XbelParser;

impl XbelParser {
    pub fn new() -> Self {
        Self
    }
}

impl MarkupParser for XbelParser {
    fn parse(&self, text: &str) -> Result<RawNode, ParseError> {
        let result = parse_xbel(text);
        match &result {
            Ok(root) => debug!(
                folders = root.folders.len(),
                bookmarks = root.bookmarks.len(),
                "Parsed XBEL document"
            ),
            Err(e) => error!(error = ?e, "Failed to parse XBEL document"),
        }
        result
    }
}

/// Element currently open on the reader's stack.
enum Frame {
    Folder(RawNode),
    Bookmark(RawBookmark),
    Title(String),
    Skip(String),
}

impl Frame {
    fn name(&self) -> &str {
        match self {
            Frame::Folder(_) => "folder",
            Frame::Bookmark(_) => "bookmark",
            Frame::Title(_) => "title",
            Frame::Skip(name) => name,
        }
    }
}

pub fn parse_xbel(text: &str) -> Result<RawNode, ParseError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<RawNode> = None;

    loop {
        let event = reader.read_event().map_err(|e| ParseError::Malformed {
            position: reader.buffer_position().to_string(),
            message: e.to_string(),
        })?;

        match event {
            Event::Start(e) => {
                let frame = open_frame(&e).map_err(|message| ParseError::Malformed {
                    position: reader.buffer_position().to_string(),
                    message,
                })?;
                stack.push(frame);
            }
            Event::Empty(e) => {
                let frame = open_frame(&e).map_err(|message| ParseError::Malformed {
                    position: reader.buffer_position().to_string(),
                    message,
                })?;
                close_frame(frame, &mut stack, &mut root);
            }
            Event::Text(t) => {
                if let Some(Frame::Title(buf)) = stack.last_mut() {
                    let unescaped = t.unescape().map_err(|e| ParseError::Malformed {
                        position: reader.buffer_position().to_string(),
                        message: e.to_string(),
                    })?;
                    buf.push_str(&unescaped);
                }
            }
            Event::CData(c) => {
                if let Some(Frame::Title(buf)) = stack.last_mut() {
                    buf.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                if let Some(frame) = stack.pop() {
                    close_frame(frame, &mut stack, &mut root);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::UnexpectedEof(open.name().to_string()));
    }
    root.ok_or(ParseError::MissingRoot)
}

fn open_frame(e: &BytesStart<'_>) -> Result<Frame, String> {
    let frame = match e.local_name().as_ref() {
        b"xbel" | b"folder" => Frame::Folder(RawNode::default()),
        b"bookmark" => Frame::Bookmark(RawBookmark {
            href: attribute(e, b"href")?,
            title: None,
        }),
        b"title" => Frame::Title(String::new()),
        other => Frame::Skip(String::from_utf8_lossy(other).into_owned()),
    };
    Ok(frame)
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        if attr.key.local_name().as_ref() == key {
            let value = attr.unescape_value().map_err(|err| err.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Attach a finished element to whatever encloses it. Elements whose parent
/// cannot hold them (e.g. a folder inside `<info>`) are discarded.
fn close_frame(frame: Frame, stack: &mut [Frame], root: &mut Option<RawNode>) {
    let parent = stack.last_mut();
    match (frame, parent) {
        (Frame::Folder(node), None) => {
            if root.is_none() {
                *root = Some(node);
            }
        }
        (Frame::Folder(node), Some(Frame::Folder(parent))) => parent.folders.push(node),
        (Frame::Bookmark(bookmark), Some(Frame::Folder(parent))) => {
            parent.bookmarks.push(bookmark)
        }
        (Frame::Title(text), Some(Frame::Folder(parent))) => {
            parent.title = Some(collapse_whitespace(&text))
        }
        (Frame::Title(text), Some(Frame::Bookmark(bookmark))) => {
            bookmark.title = Some(collapse_whitespace(&text))
        }
        _ => {}
    }
}

/// Titles render on a single Markdown line, so line breaks and runs of
/// whitespace become one space.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
