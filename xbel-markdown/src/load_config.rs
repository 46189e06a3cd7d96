//! `load_config` module: loads the YAML config file into a typed [`CliConfig`].
//!
//! This is the only place untrusted YAML is parsed. The `convert` section maps
//! directly onto [`ConvertConfig`] from the core crate; `schedule` and
//! `storage` only matter to the CLI's trigger and storage setup.
//!
//! ```yaml
//! convert:
//!   input_folder_path: /home/me/Sync
//!   input_file_name: bookmarks.xbel
//!   output_folder_path: /home/me/vault/notes
//!   output_file_name: Bookmarks.md
//!   backup_folder_path: /home/me/vault/.backups
//!   retention_count: 5
//! schedule:
//!   interval_seconds: 900
//!   run_on_startup: true
//! storage:
//!   trash_folder: /home/me/vault/.trash
//! ```
//!
//! # Errors
//! All errors use `anyhow::Error` and name the file or field at fault.
use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use xbel_markdown_core::config::ConvertConfig;

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub convert: ConvertConfig,
    #[serde(default)]
    pub schedule: ScheduleSection,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleSection {
    pub interval_seconds: Option<u64>,
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        Self {
            interval_seconds: None,
            run_on_startup: default_run_on_startup(),
        }
    }
}

fn default_run_on_startup() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageSection {
    pub trash_folder: Option<PathBuf>,
}

/// Loads and validates a YAML config file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    validate(&config)?;
    config.convert.trace_loaded();
    Ok(config)
}

fn validate(config: &CliConfig) -> Result<()> {
    if config.convert.input_file_name.trim().is_empty() {
        error!("convert.input_file_name is empty");
        anyhow::bail!("convert.input_file_name must not be empty");
    }
    if config.convert.output_file_name.trim().is_empty() {
        error!("convert.output_file_name is empty");
        anyhow::bail!("convert.output_file_name must not be empty");
    }
    if config.schedule.interval_seconds == Some(0) {
        error!("schedule.interval_seconds is zero");
        anyhow::bail!("schedule.interval_seconds must be greater than zero");
    }
    Ok(())
}
