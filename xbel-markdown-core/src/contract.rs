#![allow(unused)]

//! # contract: interfaces the conversion pipeline consumes
//!
//! The core never touches the filesystem, an XML library or the wall clock
//! directly. It talks to three collaborators:
//!
//! - [`Storage`]: files and folders (existence, listing, create, read, write, move, delete)
//! - [`MarkupParser`]: turns the input text into a loosely-shaped [`RawNode`] tree
//! - [`Clock`]: local wall-clock time used for backup names
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall` so tests can script failures
//!   (e.g. a storage provider that cannot create the backup folder).
//!
//! ## Implementations
//! - [`crate::storage::LocalStorage`], [`crate::parse::XbelParser`] and [`SystemClock`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use mockall::{automock, predicate::*};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{ParseError, StorageError};

/// A file found inside a folder, as reported by [`Storage::list_children`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageEntry {
    pub path: PathBuf,
    /// Last modification time of the entry.
    pub modified: DateTime<Utc>,
}

/// Trait for the storage location holding the input, output and backups.
///
/// All methods are async; every call is a point where a cooperative runtime
/// may switch to other work. Implementations must not provide any locking:
/// callers guarantee that two runs never share a backup folder concurrently.
#[cfg_attr(any(test, feature = "test-mocks"), automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    /// Whether a file or folder exists at `path`.
    async fn exists(&self, path: &Path) -> bool;

    /// Files directly inside `folder`, in the provider's native order.
    async fn list_children(&self, folder: &Path) -> Result<Vec<StorageEntry>, StorageError>;

    /// Create `path` and any missing parents.
    async fn create_folder(&self, path: &Path) -> Result<(), StorageError>;

    /// Read a whole file as UTF-8. Fails with [`StorageError::NotFound`] when absent
    /// and [`StorageError::InvalidUtf8`] when the bytes are not UTF-8.
    async fn read_text(&self, path: &Path) -> Result<String, StorageError>;

    /// Create a new file holding `text`. Fails with [`StorageError::AlreadyExists`]
    /// instead of overwriting.
    async fn write_new_file(&self, path: &Path, text: &str) -> Result<(), StorageError>;

    /// Move (rename) `from` to `to`. Never overwrites an existing `to`.
    async fn move_entry(&self, from: &Path, to: &Path) -> Result<(), StorageError>;

    /// Remove `path`, to a trash location when the provider has one.
    async fn soft_delete(&self, path: &Path) -> Result<(), StorageError>;
}

/// A bookmark leaf as it appears in the parsed document. Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBookmark {
    pub href: Option<String>,
    pub title: Option<String>,
}

/// A node of the parsed document: an optional title plus ordered nested
/// folders and ordered bookmark leaves. No schema is guaranteed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawNode {
    pub title: Option<String>,
    pub folders: Vec<RawNode>,
    pub bookmarks: Vec<RawBookmark>,
}

impl RawNode {
    /// A node that carries neither folders nor bookmarks.
    pub fn is_bare(&self) -> bool {
        self.folders.is_empty() && self.bookmarks.is_empty()
    }
}

/// Structured-markup parser: whole input text in, raw document tree out.
#[cfg_attr(any(test, feature = "test-mocks"), automock)]
pub trait MarkupParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<RawNode, ParseError>;
}

/// Source of local wall-clock time.
#[cfg_attr(any(test, feature = "test-mocks"), automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// [`Clock`] backed by the operating system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}
