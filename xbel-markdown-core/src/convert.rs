//! High-level pipeline: rotate → read → parse → normalize → render → write.
//!
//! [`run`] is the single entry point every trigger (manual, startup,
//! periodic) calls. Each step runs only if the previous one succeeded:
//!   1. Ensure the output folder exists
//!   2. Archive the previous output into the backup folder, if there is one
//!   3. Prune old backups
//!   4. Read the input document
//!   5. Parse it into a raw tree ([`MarkupParser`])
//!   6. Normalize it ([`crate::normalize`])
//!   7. Render Markdown ([`crate::render`])
//!   8. Write the Markdown as a new file at the output path
//!
//! # Error Handling
//! Failures in steps 1-3 abort before the input is read, so the previous
//! output is never overwritten without a backup. Input that is not UTF-8
//! is reported as a parse failure. Failures in 4-5 abort
//! without touching backups further. Nothing is rolled back: a run that fails
//! after step 2 leaves the archived backup in place and no output file.
//!
//! # Concurrency
//! There is no locking. Callers must not start a run while another run on
//! the same output or backup folder is in flight.

use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::config::ConvertConfig;
use crate::contract::{Clock, MarkupParser, Storage};
use crate::error::{ConversionError, ParseError, StorageError};
use crate::normalize::normalize;
use crate::render::render_document;
use crate::rotation;

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub output_path: PathBuf,
    pub archived: Option<PathBuf>,
    pub pruned: Vec<PathBuf>,
    pub folders: usize,
    pub links: usize,
    pub bytes: usize,
}

pub async fn run<S, P, C>(
    config: &ConvertConfig,
    storage: &S,
    parser: &P,
    clock: &C,
) -> Result<RunReport, ConversionError>
where
    S: Storage + ?Sized,
    P: MarkupParser + ?Sized,
    C: Clock + ?Sized,
{
    let input_path = config.input_path();
    let output_path = config.output_path();
    info!(
        input = %input_path.display(),
        output = %output_path.display(),
        "[CONVERT] Starting conversion run"
    );

    // Step 1: output folder
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !storage.exists(parent).await {
            storage.create_folder(parent).await.map_err(|e| {
                error!(error = ?e, path = %parent.display(), "[CONVERT][ERROR] Failed to create output folder");
                ConversionError::Io(e)
            })?;
            info!(path = %parent.display(), "[CONVERT] Created output folder");
        }
    }

    // Steps 2-3: archive, then prune
    let outcome = rotation::rotate(
        storage,
        clock,
        &output_path,
        &config.backup_folder_path,
        config.retention_count,
    )
    .await?;

    // Step 4: read
    let text = match storage.read_text(&input_path).await {
        Ok(text) => text,
        Err(StorageError::NotFound(path)) => {
            error!(path = %path.display(), "[CONVERT][ERROR] Input file not found");
            return Err(ConversionError::InputNotFound(path));
        }
        Err(StorageError::InvalidUtf8 { path, valid_up_to }) => {
            error!(path = %path.display(), valid_up_to, "[CONVERT][ERROR] Input is not UTF-8 text");
            return Err(ConversionError::Parse(ParseError::Malformed {
                position: valid_up_to.to_string(),
                message: "input is not valid UTF-8".to_string(),
            }));
        }
        Err(e) => {
            error!(error = ?e, "[CONVERT][ERROR] Failed to read input");
            return Err(ConversionError::Io(e));
        }
    };
    debug!(bytes = text.len(), "[CONVERT] Read input document");

    // Steps 5-7: parse, normalize, render
    let raw = parser.parse(&text)?;
    let tree = normalize(&raw);
    let markdown = render_document(&tree);

    // Step 8: write
    match storage.write_new_file(&output_path, &markdown).await {
        Ok(()) => {}
        Err(StorageError::AlreadyExists(path)) => {
            error!(path = %path.display(), "[CONVERT][ERROR] Output reappeared before write");
            return Err(ConversionError::AlreadyExists(path));
        }
        Err(e) => {
            error!(error = ?e, "[CONVERT][ERROR] Failed to write output");
            return Err(ConversionError::Io(e));
        }
    }

    let report = RunReport {
        output_path,
        archived: outcome.archived,
        pruned: outcome.pruned,
        folders: tree.folder_count(),
        links: tree.link_count(),
        bytes: markdown.len(),
    };
    info!(
        folders = report.folders,
        links = report.links,
        pruned = report.pruned.len(),
        "[CONVERT] Conversion run complete"
    );
    match serde_json::to_string(&report) {
        Ok(json) => debug!(json = %json, "[CONVERT][DEBUG] Run report"),
        Err(e) => error!(error = ?e, "[CONVERT][DEBUG] Failed to serialize run report"),
    }
    Ok(report)
}
