//! Malscan Core Library
//!
//! Configuration, error types and domain models shared by every malscan crate.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, ScanServiceConfig, SmtpConfig};
pub use error::{AppError, ErrorMetadata, LogLevel, ScanError};
pub use models::{AnalysisHandle, DigestSet, EmailStatus, ScanResponse, ScanVerdicts};
