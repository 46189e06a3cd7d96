//! Local filesystem [`Storage`] provider on top of `tokio::fs`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

use crate::contract::{Storage, StorageEntry};
use crate::error::StorageError;

/// Files and folders on the local disk.
///
/// With a trash folder configured, [`Storage::soft_delete`] moves entries
/// there instead of removing them.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    trash_dir: Option<PathBuf>,
}

impl LocalStorage {
    pub fn new() -> Self {
        Self { trash_dir: None }
    }

    pub fn with_trash(trash_dir: impl Into<PathBuf>) -> Self {
        Self {
            trash_dir: Some(trash_dir.into()),
        }
    }

    pub fn trash_dir(&self) -> Option<&Path> {
        self.trash_dir.as_deref()
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn exists(&self, path: &Path) -> bool {
        match tokio::fs::try_exists(path).await {
            Ok(found) => found,
            Err(e) => {
                error!(error = ?e, path = %path.display(), "[STORAGE] Existence check failed, treating as absent");
                false
            }
        }
    }

    async fn list_children(&self, folder: &Path) -> Result<Vec<StorageEntry>, StorageError> {
        let mut dir = tokio::fs::read_dir(folder)
            .await
            .map_err(|e| StorageError::from_io(folder, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| StorageError::from_io(folder, e))?
        {
            let path = entry.path();
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| StorageError::from_io(&path, e))?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata
                .modified()
                .map_err(|e| StorageError::from_io(&path, e))?;
            entries.push(StorageEntry {
                path,
                modified: DateTime::<Utc>::from(modified),
            });
        }
        debug!(folder = %folder.display(), count = entries.len(), "[STORAGE] Listed folder");
        Ok(entries)
    }

    async fn create_folder(&self, path: &Path) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(path).await.map_err(|e| {
            error!(error = ?e, path = %path.display(), "[STORAGE] Failed to create folder");
            StorageError::from_io(path, e)
        })?;
        debug!(path = %path.display(), "[STORAGE] Created folder");
        Ok(())
    }

    async fn read_text(&self, path: &Path) -> Result<String, StorageError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;
        String::from_utf8(bytes).map_err(|e| {
            let valid_up_to = e.utf8_error().valid_up_to();
            error!(path = %path.display(), valid_up_to, "[STORAGE] File is not valid UTF-8");
            StorageError::InvalidUtf8 {
                path: path.to_path_buf(),
                valid_up_to,
            }
        })
    }

    async fn write_new_file(&self, path: &Path, text: &str) -> Result<(), StorageError> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| StorageError::from_io(path, e))?;
        file.write_all(text.as_bytes())
            .await
            .map_err(|e| StorageError::from_io(path, e))?;
        file.flush()
            .await
            .map_err(|e| StorageError::from_io(path, e))?;
        debug!(path = %path.display(), bytes = text.len(), "[STORAGE] Wrote new file");
        Ok(())
    }

    async fn move_entry(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        if self.exists(to).await {
            return Err(StorageError::AlreadyExists(to.to_path_buf()));
        }
        tokio::fs::rename(from, to).await.map_err(|e| {
            error!(error = ?e, from = %from.display(), to = %to.display(), "[STORAGE] Move failed");
            StorageError::from_io(from, e)
        })?;
        debug!(from = %from.display(), to = %to.display(), "[STORAGE] Moved entry");
        Ok(())
    }

    async fn soft_delete(&self, path: &Path) -> Result<(), StorageError> {
        match &self.trash_dir {
            Some(trash) => {
                self.create_folder(trash).await?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let target = trash.join(format!("{}-{}", uuid::Uuid::new_v4(), file_name));
                self.move_entry(path, &target).await?;
                info!(path = %path.display(), trash = %target.display(), "[STORAGE] Moved to trash");
            }
            None => {
                tokio::fs::remove_file(path)
                    .await
                    .map_err(|e| StorageError::from_io(path, e))?;
                info!(path = %path.display(), "[STORAGE] Deleted file");
            }
        }
        Ok(())
    }
}
