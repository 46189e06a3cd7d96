//! Backup rotation: archive the previous output, then prune old backups.
//!
//! Archiving moves `<base>.<ext>` to `<backup folder>/<base>-<YYYYMMDDHHMMSS>.<ext>`
//! using local wall-clock time. A second rotation within the same second gets
//! a `-<n>` suffix instead of replacing the earlier backup.
//!
//! Pruning deletes `entries - retention_count + 1` of the oldest backups. The
//! `+ 1` counts the backup just archived a second time, so a folder that
//! receives one backup per run settles at `retention_count - 1` files.
//! `tests/backup_rotation.rs` pins that steady state.

use chrono::NaiveDateTime;
use futures::future::try_join_all;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::contract::{Clock, Storage};
use crate::error::RotationError;

/// Fixed-width, separator-free timestamp used in backup names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// What a rotation did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RotationOutcome {
    /// Where the previous output was moved, if there was one.
    pub archived: Option<PathBuf>,
    /// Backups removed by pruning, oldest first.
    pub pruned: Vec<PathBuf>,
}

/// Backup file name for `original` archived at `at`:
/// `bookmarks.md` → `bookmarks-20240102030405.md`.
pub fn backup_file_name(original: &Path, at: NaiveDateTime) -> String {
    backup_file_name_with_suffix(original, at, None)
}

fn backup_file_name_with_suffix(
    original: &Path,
    at: NaiveDateTime,
    suffix: Option<usize>,
) -> String {
    let base = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stamp = at.format(TIMESTAMP_FORMAT);
    let stem = match suffix {
        Some(n) => format!("{base}-{stamp}-{n}"),
        None => format!("{base}-{stamp}"),
    };
    match original.extension() {
        Some(ext) => format!("{}.{}", stem, ext.to_string_lossy()),
        None => stem,
    }
}

/// Move an existing `output` into `backup_dir` under a timestamped name.
///
/// Returns `Ok(None)` when there is nothing to archive. The backup folder is
/// created on demand. Any failure leaves `output` where it was.
pub async fn archive_existing<S, C>(
    storage: &S,
    clock: &C,
    output: &Path,
    backup_dir: &Path,
) -> Result<Option<PathBuf>, RotationError>
where
    S: Storage + ?Sized,
    C: Clock + ?Sized,
{
    if !storage.exists(output).await {
        debug!(output = %output.display(), "[ROTATE] No previous output to archive");
        return Ok(None);
    }

    if !storage.exists(backup_dir).await {
        storage.create_folder(backup_dir).await.map_err(|e| {
            error!(error = ?e, path = %backup_dir.display(), "[ROTATE][ERROR] Failed to create backup folder");
            RotationError::CreateBackupFolder {
                path: backup_dir.to_path_buf(),
                source: e,
            }
        })?;
        info!(path = %backup_dir.display(), "[ROTATE] Created backup folder");
    }

    let at = clock.now();
    let mut target = backup_dir.join(backup_file_name(output, at));
    let mut suffix = 1;
    while storage.exists(&target).await {
        target = backup_dir.join(backup_file_name_with_suffix(output, at, Some(suffix)));
        suffix += 1;
    }

    storage.move_entry(output, &target).await.map_err(|e| {
        error!(error = ?e, from = %output.display(), to = %target.display(), "[ROTATE][ERROR] Failed to archive previous output");
        RotationError::Archive {
            from: output.to_path_buf(),
            to: target.clone(),
            source: e,
        }
    })?;
    info!(from = %output.display(), to = %target.display(), "[ROTATE] Archived previous output");
    Ok(Some(target))
}

/// Delete the oldest backups in `backup_dir` so that at most
/// `retention_count - 1` remain (see the module docs for why `- 1`).
///
/// Entries are ordered by modification time; ties keep the storage
/// provider's listing order. A missing folder has nothing to prune.
pub async fn prune_backups<S>(
    storage: &S,
    backup_dir: &Path,
    retention_count: usize,
) -> Result<Vec<PathBuf>, RotationError>
where
    S: Storage + ?Sized,
{
    if !storage.exists(backup_dir).await {
        return Ok(Vec::new());
    }

    let mut entries = storage.list_children(backup_dir).await.map_err(|e| {
        error!(error = ?e, path = %backup_dir.display(), "[ROTATE][ERROR] Failed to list backups");
        RotationError::List {
            path: backup_dir.to_path_buf(),
            source: e,
        }
    })?;
    entries.sort_by_key(|entry| entry.modified);

    let to_delete = (entries.len() + 1).saturating_sub(retention_count);
    let to_delete = to_delete.min(entries.len());
    if to_delete == 0 {
        debug!(count = entries.len(), retention_count, "[ROTATE] Nothing to prune");
        return Ok(Vec::new());
    }

    let doomed: Vec<PathBuf> = entries
        .into_iter()
        .take(to_delete)
        .map(|entry| entry.path)
        .collect();

    let deletions = doomed.iter().map(|path| async move {
        storage.soft_delete(path).await.map_err(|e| {
            error!(error = ?e, path = %path.display(), "[ROTATE][ERROR] Failed to delete backup");
            RotationError::Delete {
                path: path.clone(),
                source: e,
            }
        })
    });
    try_join_all(deletions).await?;

    info!(deleted = doomed.len(), retention_count, "[ROTATE] Pruned old backups");
    Ok(doomed)
}

/// Archive the previous output (if any) and then prune, in that order.
pub async fn rotate<S, C>(
    storage: &S,
    clock: &C,
    output: &Path,
    backup_dir: &Path,
    retention_count: usize,
) -> Result<RotationOutcome, RotationError>
where
    S: Storage + ?Sized,
    C: Clock + ?Sized,
{
    let archived = archive_existing(storage, clock, output, backup_dir).await?;
    let pruned = prune_backups(storage, backup_dir, retention_count).await?;
    Ok(RotationOutcome { archived, pruned })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn backup_name_keeps_extension() {
        assert_eq!(
            backup_file_name(Path::new("notes/bookmarks.md"), at()),
            "bookmarks-20240102030405.md"
        );
    }

    #[test]
    fn backup_name_without_extension() {
        assert_eq!(
            backup_file_name(Path::new("bookmarks"), at()),
            "bookmarks-20240102030405"
        );
    }

    #[test]
    fn collision_suffix_goes_before_extension() {
        assert_eq!(
            backup_file_name_with_suffix(Path::new("bookmarks.md"), at(), Some(2)),
            "bookmarks-20240102030405-2.md"
        );
    }
}
