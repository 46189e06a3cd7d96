use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Locations and retention policy for one conversion run.
///
/// Passed explicitly to [`crate::convert::run`]; the core never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub input_folder_path: PathBuf,
    pub input_file_name: String,
    pub output_folder_path: PathBuf,
    pub output_file_name: String,
    pub backup_folder_path: PathBuf,
    /// How many backups to keep when pruning (see [`crate::rotation::prune_backups`]).
    pub retention_count: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input_folder_path: PathBuf::from("."),
            input_file_name: "bookmarks.xbel".to_string(),
            output_folder_path: PathBuf::from("."),
            output_file_name: "bookmarks.md".to_string(),
            backup_folder_path: PathBuf::from("backups"),
            retention_count: 5,
        }
    }
}

impl ConvertConfig {
    pub fn input_path(&self) -> PathBuf {
        self.input_folder_path.join(&self.input_file_name)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_folder_path.join(&self.output_file_name)
    }

    pub fn trace_loaded(&self) {
        info!(
            input = %self.input_path().display(),
            output = %self.output_path().display(),
            backups = %self.backup_folder_path.display(),
            retention_count = self.retention_count,
            "Loaded ConvertConfig"
        );
        debug!(?self, "ConvertConfig loaded (full debug)");
    }
}
