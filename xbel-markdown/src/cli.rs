//! `cli` module: command parsing and triggers.
//!
//! This module implements the CLI interface for xbel-markdown: command
//! parsing, the manual (`convert`) and periodic (`watch`) triggers, and
//! user-visible reporting.
//!
//! All conversion logic (tree model, Markdown rendering, backup rotation)
//! lives in the [`xbel_markdown_core`] crate. This module only builds the
//! collaborators and decides when to call [`xbel_markdown_core::convert::run`].
//!
//! ## How To Use
//! - For command-line users: `xbel-markdown convert --config config.yaml`.
//! - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use xbel_markdown_core::config::ConvertConfig;
use xbel_markdown_core::contract::{Clock, MarkupParser, Storage, SystemClock};
use xbel_markdown_core::parse::XbelParser;
use xbel_markdown_core::storage::LocalStorage;

use crate::load_config::{load_config, CliConfig};
use crate::watch::watch;

/// CLI for xbel-markdown: keep a Markdown note in sync with an XBEL bookmark export.
#[derive(Parser)]
#[clap(
    name = "xbel-markdown",
    version,
    about = "Convert an XBEL bookmark export into a Markdown note, keeping rotating backups"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert once and exit
    Convert {
        /// Path to the YAML config file
        #[clap(long, env = "XBEL_MARKDOWN_CONFIG")]
        config: PathBuf,
    },
    /// Convert on startup and then every interval until interrupted
    Watch {
        /// Path to the YAML config file
        #[clap(long, env = "XBEL_MARKDOWN_CONFIG")]
        config: PathBuf,
        /// Seconds between runs; overrides schedule.interval_seconds
        #[clap(long, value_name = "SECONDS")]
        interval: Option<u64>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("cli_started");

    match cli.command {
        Commands::Convert { config } => {
            let config = load_config(config)?;
            let storage = build_storage(&config);
            let report = xbel_markdown_core::convert::run(
                &config.convert,
                &storage,
                &XbelParser::new(),
                &SystemClock,
            )
            .await
            .context("Conversion failed")?;

            info!(command = "convert", ?report, "Conversion complete");
            println!(
                "Wrote {} ({} links in {} folders)",
                report.output_path.display(),
                report.links,
                report.folders
            );
            if let Some(archived) = &report.archived {
                println!("Previous output backed up to {}", archived.display());
            }
            Ok(())
        }
        Commands::Watch { config, interval } => {
            let config = load_config(config)?;
            let seconds = interval
                .or(config.schedule.interval_seconds)
                .context("No interval given: pass --interval or set schedule.interval_seconds")?;
            if seconds == 0 {
                anyhow::bail!("--interval must be greater than zero");
            }

            let storage = build_storage(&config);
            let parser = XbelParser::new();
            let clock = SystemClock;
            let (convert_config, storage, parser, clock) =
                (&config.convert, &storage, &parser, &clock);

            info!(command = "watch", interval_seconds = seconds, "Watching for changes");
            let runs = watch(
                Duration::from_secs(seconds),
                config.schedule.run_on_startup,
                move || convert_and_log(convert_config, storage, parser, clock),
                shutdown_signal(),
            )
            .await;
            info!(command = "watch", runs, "Watch stopped");
            Ok(())
        }
    }
}

fn build_storage(config: &CliConfig) -> LocalStorage {
    match &config.storage.trash_folder {
        Some(trash) => LocalStorage::with_trash(trash),
        None => LocalStorage::new(),
    }
}

/// One scheduled run. Failures are logged and left for the next tick to retry.
async fn convert_and_log<S, P, C>(config: &ConvertConfig, storage: &S, parser: &P, clock: &C)
where
    S: Storage,
    P: MarkupParser,
    C: Clock,
{
    match xbel_markdown_core::convert::run(config, storage, parser, clock).await {
        Ok(report) => info!(?report, "Scheduled conversion complete"),
        Err(e) => error!(error = %e, "Scheduled conversion failed"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = ?e, "Failed to listen for Ctrl-C; watch runs until killed");
        std::future::pending::<()>().await;
    }
}
