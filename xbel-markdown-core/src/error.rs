//! Error types for the conversion pipeline.
//!
//! Storage and parser collaborators report [`StorageError`] and [`ParseError`];
//! the rotation step wraps storage failures in [`RotationError`] so callers can
//! tell which step of the backup went wrong. [`ConversionError`] is what a run
//! returns to its trigger.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a [`crate::contract::Storage`] implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("{} is not valid UTF-8 (valid up to byte {valid_up_to})", path.display())]
    InvalidUtf8 { path: PathBuf, valid_up_to: usize },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// Map an `std::io::Error` onto the storage taxonomy by its kind.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(path),
            std::io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(path),
            _ => StorageError::Io { path, source },
        }
    }
}

/// The input text could not be turned into a raw bookmark document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed markup near byte {position}: {message}")]
    Malformed { position: String, message: String },

    #[error("document has no <xbel> or <folder> root element")]
    MissingRoot,

    #[error("document ended inside an open <{0}> element")]
    UnexpectedEof(String),
}

/// A step of the backup rotation failed. Every variant aborts the run before
/// the new output is written.
#[derive(Debug, Error)]
pub enum RotationError {
    #[error("failed to create backup folder {}: {source}", path.display())]
    CreateBackupFolder {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    #[error("failed to archive {} to {}: {source}", from.display(), to.display())]
    Archive {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: StorageError,
    },

    #[error("failed to list backups in {}: {source}", path.display())]
    List {
        path: PathBuf,
        #[source]
        source: StorageError,
    },

    #[error("failed to delete backup {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: StorageError,
    },
}

/// Errors returned by [`crate::convert::run`].
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("failed to parse bookmark document: {0}")]
    Parse(#[from] ParseError),

    #[error("output already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("backup rotation failed: {0}")]
    Rotation(#[from] RotationError),

    #[error("storage operation failed: {0}")]
    Io(#[from] StorageError),
}
