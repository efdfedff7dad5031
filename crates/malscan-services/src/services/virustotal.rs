//! VirusTotal v3 client: digest lookup, file upload and analysis polling.

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use malscan_core::{AnalysisHandle, ScanError, ScanServiceConfig, ScanVerdicts};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::clock::{Clock, TokioClock};

const API_KEY_HEADER: &str = "x-apikey";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const STATUS_COMPLETED: &str = "completed";

/// Operations against a remote malware-intelligence service.
#[async_trait]
pub trait ScanProvider: Send + Sync {
    /// Fetch existing verdicts for a SHA-256. `ScanError::NotFound` when the
    /// service has never seen the file.
    async fn lookup(&self, sha256: &str) -> Result<ScanVerdicts, ScanError>;

    /// Upload file contents for fresh analysis.
    async fn submit(&self, file_name: &str, contents: Bytes) -> Result<AnalysisHandle, ScanError>;

    /// Poll at a fixed interval until the analysis completes, `max_wait`
    /// elapses, a query fails, or `cancel` fires.
    async fn poll_until_complete(
        &self,
        handle: &AnalysisHandle,
        max_wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<ScanVerdicts, ScanError>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct FileObject {
    attributes: FileAttributes,
}

#[derive(Debug, Deserialize)]
struct FileAttributes {
    last_analysis_stats: BTreeMap<String, u64>,
}

#[derive(Debug, Deserialize)]
struct UploadObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AnalysisObject {
    attributes: AnalysisAttributes,
}

#[derive(Debug, Deserialize)]
struct AnalysisAttributes {
    status: String,
    #[serde(default)]
    stats: Option<BTreeMap<String, u64>>,
}

#[derive(Clone)]
pub struct VirusTotalClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    poll_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for VirusTotalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirusTotalClient")
            .field("base_url", &self.base_url)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl VirusTotalClient {
    pub fn new(config: &ScanServiceConfig) -> anyhow::Result<Self> {
        Self::with_clock(config, Arc::new(TokioClock))
    }

    /// Create with a custom time source for the poll loop.
    pub fn with_clock(config: &ScanServiceConfig, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client for VirusTotal")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            clock,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    async fn fetch_analysis(&self, handle: &AnalysisHandle) -> Result<AnalysisAttributes, ScanError> {
        let url = format!("{}/analyses/{}", self.base_url, handle);
        let response = self
            .authorized(self.http.get(&url))
            .send()
            .await
            .map_err(|e| ScanError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScanError::Rejected {
                status: status.as_u16(),
            });
        }

        let analysis: Envelope<AnalysisObject> = response
            .json()
            .await
            .map_err(|e| ScanError::MalformedResponse(e.to_string()))?;
        Ok(analysis.data.attributes)
    }
}

#[async_trait]
impl ScanProvider for VirusTotalClient {
    async fn lookup(&self, sha256: &str) -> Result<ScanVerdicts, ScanError> {
        let url = format!("{}/files/{}", self.base_url, sha256);
        let response = self
            .authorized(self.http.get(&url))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Network error during VirusTotal search");
                ScanError::Transport(e.to_string())
            })?;

        match response.status() {
            StatusCode::OK => {
                let file: Envelope<FileObject> = response
                    .json()
                    .await
                    .map_err(|e| ScanError::MalformedResponse(e.to_string()))?;
                Ok(ScanVerdicts(file.data.attributes.last_analysis_stats))
            }
            StatusCode::NOT_FOUND => Err(ScanError::NotFound),
            status => Err(ScanError::Rejected {
                status: status.as_u16(),
            }),
        }
    }

    async fn submit(&self, file_name: &str, contents: Bytes) -> Result<AnalysisHandle, ScanError> {
        let url = format!("{}/files", self.base_url);
        let size = contents.len();
        let form = Form::new().part(
            "file",
            Part::bytes(contents.to_vec()).file_name(file_name.to_string()),
        );

        let response = self
            .authorized(self.http.post(&url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Error during file upload to VirusTotal");
                ScanError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = %status, body = %body, "VirusTotal rejected upload");
            return Err(ScanError::Rejected {
                status: status.as_u16(),
            });
        }

        let upload: Envelope<UploadObject> = response
            .json()
            .await
            .map_err(|e| ScanError::MalformedResponse(e.to_string()))?;

        tracing::info!(analysis_id = %upload.data.id, size, "File submitted to VirusTotal");
        Ok(AnalysisHandle::new(upload.data.id))
    }

    async fn poll_until_complete(
        &self,
        handle: &AnalysisHandle,
        max_wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<ScanVerdicts, ScanError> {
        let start = self.clock.now();
        let deadline = start + max_wait;
        let mut attempt: u32 = 0;

        loop {
            let elapsed = self.clock.now().duration_since(start);
            if elapsed >= max_wait {
                break;
            }
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            attempt += 1;

            // A slow response must not stretch the overall wait past the deadline.
            let fetched = tokio::select! {
                result = self.fetch_analysis(handle) => result,
                _ = self.clock.sleep_until(deadline) => break,
                _ = cancel.cancelled() => return Err(ScanError::Cancelled),
            };
            let analysis = fetched.map_err(|e| {
                tracing::error!(
                    analysis_id = %handle,
                    attempt,
                    cause = e.cause(),
                    error = %e,
                    "Failed to fetch VirusTotal analysis"
                );
                e
            })?;

            if analysis.status == STATUS_COMPLETED {
                let stats = analysis.stats.ok_or_else(|| {
                    ScanError::MalformedResponse("completed analysis has no stats".to_string())
                })?;
                tracing::info!(
                    analysis_id = %handle,
                    attempts = attempt,
                    "VirusTotal analysis completed"
                );
                return Ok(ScanVerdicts(stats));
            }

            tracing::debug!(
                analysis_id = %handle,
                attempt,
                status = %analysis.status,
                "Waiting for VirusTotal analysis to complete"
            );

            let remaining = max_wait.saturating_sub(self.clock.now().duration_since(start));
            if remaining.is_zero() {
                break;
            }
            tokio::select! {
                _ = self.clock.sleep(self.poll_interval.min(remaining)) => {}
                _ = cancel.cancelled() => return Err(ScanError::Cancelled),
            }
        }

        tracing::warn!(
            analysis_id = %handle,
            attempts = attempt,
            waited_secs = max_wait.as_secs(),
            "VirusTotal analysis did not complete in time"
        );
        Err(ScanError::DeadlineExceeded {
            waited_secs: max_wait.as_secs(),
        })
    }
}
