//! Domain models shared by the services and the HTTP layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// MD5, SHA-256 and SHA-512 of one byte stream, lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DigestSet {
    pub md5: String,
    pub sha256: String,
    pub sha512: String,
}

impl DigestSet {
    /// Deterministic report file name for these digests.
    pub fn report_filename(&self) -> String {
        format!("report-{}.pdf", self.sha256)
    }
}

/// Verdict category to engine count, exactly as the scan service reported it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ScanVerdicts(pub BTreeMap<String, u64>);

impl ScanVerdicts {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, category: &str) -> Option<u64> {
        self.0.get(category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.0.iter()
    }
}

impl FromIterator<(String, u64)> for ScanVerdicts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        ScanVerdicts(iter.into_iter().collect())
    }
}

/// Opaque identifier of a freshly submitted remote analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisHandle(String);

impl AnalysisHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AnalysisHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of the optional report email. Both fields are `null` when no
/// recipient was supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EmailStatus {
    pub sent: Option<bool>,
    pub error: Option<String>,
}

impl EmailStatus {
    pub fn not_requested() -> Self {
        Self::default()
    }

    pub fn sent() -> Self {
        Self {
            sent: Some(true),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            sent: Some(false),
            error: Some(error.into()),
        }
    }
}

/// Successful `/scan` response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScanResponse {
    pub success: bool,
    pub message: String,
    pub hashes: DigestSet,
    pub results: ScanVerdicts,
    pub report_url: String,
    pub email_status: EmailStatus,
}
