//! Scan-acquisition policy: digest lookup first, upload and poll only on a miss.

use bytes::Bytes;
use malscan_core::{DigestSet, ScanError, ScanVerdicts};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::virustotal::ScanProvider;

/// Obtain verdicts for one file.
///
/// Any lookup failure (unknown file, network error, rejection) falls back to
/// a fresh upload. An empty verdict mapping counts as no data.
pub async fn acquire_verdicts(
    provider: &dyn ScanProvider,
    digests: &DigestSet,
    file_name: &str,
    contents: Bytes,
    max_wait: Duration,
    cancel: &CancellationToken,
) -> Result<ScanVerdicts, ScanError> {
    let verdicts = match provider.lookup(&digests.sha256).await {
        Ok(verdicts) => {
            tracing::info!(sha256 = %digests.sha256, "Found existing VirusTotal analysis");
            verdicts
        }
        Err(lookup_err) => {
            if lookup_err == ScanError::NotFound {
                tracing::info!(sha256 = %digests.sha256, "File unknown to VirusTotal, uploading");
            } else {
                tracing::warn!(
                    sha256 = %digests.sha256,
                    cause = lookup_err.cause(),
                    error = %lookup_err,
                    "VirusTotal lookup failed, falling back to upload"
                );
            }
            let handle = provider.submit(file_name, contents).await?;
            provider
                .poll_until_complete(&handle, max_wait, cancel)
                .await?
        }
    };

    if verdicts.is_empty() {
        return Err(ScanError::MalformedResponse(
            "verdict mapping is empty".to_string(),
        ));
    }
    Ok(verdicts)
}
