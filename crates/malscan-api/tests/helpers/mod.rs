//! Test helpers: build the real router around a scripted scan provider.
//!
//! Run from workspace root: `cargo test -p malscan-api`.

pub mod fixtures;

use async_trait::async_trait;
use axum_test::TestServer;
use bytes::Bytes;
use malscan_api::setup;
use malscan_api::state::AppState;
use malscan_core::{AnalysisHandle, Config, ScanError, ScanVerdicts};
use malscan_services::ScanProvider;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Calls observed by [`RecordingProvider`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Lookup(String),
    Submit { file_name: String, size: usize },
    Poll(String),
}

/// Scan provider with canned answers that records every call.
pub struct RecordingProvider {
    lookup: Result<ScanVerdicts, ScanError>,
    submit: Result<AnalysisHandle, ScanError>,
    poll: Result<ScanVerdicts, ScanError>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl RecordingProvider {
    pub fn new(
        lookup: Result<ScanVerdicts, ScanError>,
        submit: Result<AnalysisHandle, ScanError>,
        poll: Result<ScanVerdicts, ScanError>,
    ) -> Self {
        Self {
            lookup,
            submit,
            poll,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Digest lookup hits.
    pub fn known(verdicts: ScanVerdicts) -> Self {
        Self::new(
            Ok(verdicts),
            Err(ScanError::Rejected { status: 500 }),
            Err(ScanError::Rejected { status: 500 }),
        )
    }

    /// Lookup misses, upload and poll succeed.
    pub fn unknown(verdicts: ScanVerdicts) -> Self {
        Self::new(
            Err(ScanError::NotFound),
            Ok(AnalysisHandle::new("analysis-1")),
            Ok(verdicts),
        )
    }

    /// Nothing obtainable.
    pub fn failing(cause: ScanError) -> Self {
        Self::new(
            Err(ScanError::NotFound),
            Ok(AnalysisHandle::new("analysis-1")),
            Err(cause),
        )
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submit_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ProviderCall::Submit { .. }))
            .count()
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ScanProvider for RecordingProvider {
    async fn lookup(&self, sha256: &str) -> Result<ScanVerdicts, ScanError> {
        self.record(ProviderCall::Lookup(sha256.to_string()));
        self.lookup.clone()
    }

    async fn submit(&self, file_name: &str, contents: Bytes) -> Result<AnalysisHandle, ScanError> {
        self.record(ProviderCall::Submit {
            file_name: file_name.to_string(),
            size: contents.len(),
        });
        self.submit.clone()
    }

    async fn poll_until_complete(
        &self,
        handle: &AnalysisHandle,
        _max_wait: Duration,
        _cancel: &CancellationToken,
    ) -> Result<ScanVerdicts, ScanError> {
        self.record(ProviderCall::Poll(handle.to_string()));
        self.poll.clone()
    }
}

/// Test application: server plus the scratch directory it writes into.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn reports_dir(&self) -> &Path {
        self.state.config.reports_dir()
    }

    pub fn uploads_dir(&self) -> &Path {
        self.state.config.uploads_dir()
    }

    /// Files currently sitting in the uploads directory.
    pub fn leftover_uploads(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.uploads_dir())
            .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
            .unwrap_or_default()
    }
}

/// Config rooted in `base_dir`, no SMTP, plus any overrides.
pub fn test_config(base_dir: &Path, overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("BASE_DIR".into(), base_dir.display().to_string());
    vars.insert("VIRUSTOTAL_API_KEY".into(), "test-key".into());
    for (k, v) in overrides {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_source(|key| vars.get(key).cloned()).expect("test config")
}

pub fn setup_test_app(provider: Arc<dyn ScanProvider>) -> TestApp {
    setup_test_app_with(provider, &[])
}

pub fn setup_test_app_with(provider: Arc<dyn ScanProvider>, overrides: &[(&str, &str)]) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(temp_dir.path(), overrides);

    let (state, router) =
        setup::build_app(config, provider, CancellationToken::new()).expect("Failed to build app");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}
