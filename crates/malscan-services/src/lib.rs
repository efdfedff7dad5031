//! Malscan Services Layer
//!
//! Scan orchestration that does not depend on HTTP: digest calculation, the
//! VirusTotal client and its lookup-then-upload policy, and PDF report
//! rendering. The API crate wires these together per request.

pub mod services;

#[cfg(any(test, feature = "test-util"))]
pub use services::ManualClock;
pub use services::{
    acquire_verdicts, compute_digests, digest_file, digest_file_blocking, render_pdf, Clock,
    ReportError, ReportRenderer, ScanProvider, TokioClock, VirusTotalClient, DIGEST_BLOCK_SIZE,
};
