//! The `/scan` request workflow.
//!
//! Received → Hashed → Scanned → Reported → (Notified) → Cleaned. The upload
//! lives in a [`NamedTempFile`] owned by [`run_scan`], so it is removed on
//! every exit path once it has been written.

use crate::state::AppState;
use crate::utils::upload::ScanUpload;
use malscan_core::{AppError, DigestSet, EmailStatus, ScanResponse, ScanVerdicts};
use malscan_services::{acquire_verdicts, digest_file_blocking};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;

const SUCCESS_MESSAGE: &str = "Scan completed successfully.";
/// Keeps temp names well under filesystem name limits.
const MAX_SUFFIX_LEN: usize = 64;

async fn save_upload(state: &AppState, upload: &ScanUpload) -> Result<NamedTempFile, AppError> {
    let uploads_dir = state.config.uploads_dir().to_path_buf();
    let tail = &upload.file_name[upload.file_name.len().saturating_sub(MAX_SUFFIX_LEN)..];
    let suffix = format!("-{}", tail);
    let contents = upload.contents.clone();

    tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
        std::fs::create_dir_all(&uploads_dir)?;
        let mut temp = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(&uploads_dir)?;
        std::io::Write::write_all(&mut temp, &contents)?;
        Ok(temp)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Upload task failed: {}", e)))?
    .map_err(|e| AppError::Internal(format!("Failed to save upload: {}", e)))
}

async fn render_report(
    state: &AppState,
    file_name: &str,
    digests: &DigestSet,
    verdicts: &ScanVerdicts,
) -> Result<PathBuf, AppError> {
    let renderer = state.reports.clone();
    let file_name = file_name.to_string();
    let digests = digests.clone();
    let verdicts = verdicts.clone();

    tokio::task::spawn_blocking(move || renderer.render(&file_name, &digests, &verdicts))
        .await
        .map_err(|e| AppError::Internal(format!("Report task failed: {}", e)))?
        .map_err(|e| AppError::Internal(e.to_string()))
}

async fn hash_upload(temp: &NamedTempFile) -> Result<DigestSet, AppError> {
    digest_file_blocking(temp.path().to_path_buf())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Error reading file for hashing");
            AppError::HashingFailed(e)
        })
}

/// Run one scan end to end.
pub async fn run_scan(
    state: &AppState,
    upload: ScanUpload,
    cancel: &CancellationToken,
) -> Result<ScanResponse, AppError> {
    let temp = save_upload(state, &upload).await?;
    tracing::info!(file_name = %upload.file_name, size = upload.contents.len(), "Received file");

    let digests = hash_upload(&temp).await?;

    let verdicts = acquire_verdicts(
        state.scanner.as_ref(),
        &digests,
        &upload.file_name,
        upload.contents,
        Duration::from_secs(state.config.scan.max_wait_secs),
        cancel,
    )
    .await
    .map_err(|e| {
        tracing::warn!(sha256 = %digests.sha256, cause = e.cause(), error = %e, "No scan results obtained");
        AppError::ScanUnavailable(e)
    })?;

    let report_path = render_report(state, &upload.file_name, &digests, &verdicts).await?;
    let report_url = format!("/report/{}", digests.report_filename());

    let email_status = match upload.email.as_deref() {
        Some(recipient) => state.email.send_report(&report_path, recipient).await,
        None => EmailStatus::not_requested(),
    };

    if let Err(e) = temp.close() {
        tracing::warn!(error = %e, "Failed to remove uploaded file");
    }

    Ok(ScanResponse {
        success: true,
        message: SUCCESS_MESSAGE.to_string(),
        hashes: digests,
        results: verdicts,
        report_url,
        email_status,
    })
}
