//! Error types module
//!
//! `AppError` is what the request workflow returns; `ScanError` records why the
//! malware-intelligence service produced no verdicts. The HTTP body stays
//! coarse (`{"error": ...}`) while the tagged cause goes to the log.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "SCAN_UNAVAILABLE")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Why no verdicts could be obtained from the scan service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("no analysis found")]
    NotFound,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("analysis did not complete within {waited_secs}s")]
    DeadlineExceeded { waited_secs: u64 },

    #[error("scan service rejected the request with status {status}")]
    Rejected { status: u16 },

    #[error("malformed scan service response: {0}")]
    MalformedResponse(String),

    #[error("scan cancelled")]
    Cancelled,
}

impl ScanError {
    /// Stable label used in structured logs.
    pub fn cause(&self) -> &'static str {
        match self {
            ScanError::NotFound => "not_found",
            ScanError::Transport(_) => "transport",
            ScanError::DeadlineExceeded { .. } => "deadline_exceeded",
            ScanError::Rejected { .. } => "rejected",
            ScanError::MalformedResponse(_) => "malformed_response",
            ScanError::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Hashing failed: {0}")]
    HashingFailed(#[source] io::Error),

    #[error("Scan results unavailable: {0}")]
    ScanUnavailable(#[source] ScanError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<ScanError> for AppError {
    fn from(err: ScanError) -> Self {
        AppError::ScanUnavailable(err)
    }
}

impl AppError {
    /// Variant name used in structured logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::HashingFailed(_) => "HashingFailed",
            AppError::ScanUnavailable(_) => "ScanUnavailable",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "InternalWithSource",
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 400,
            AppError::NotFound(_) => 404,
            AppError::PayloadTooLarge(_) => 413,
            AppError::HashingFailed(_)
            | AppError::ScanUnavailable(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            AppError::HashingFailed(_) => "HASHING_FAILED",
            AppError::ScanUnavailable(_) => "SCAN_UNAVAILABLE",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "INTERNAL_ERROR",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::HashingFailed(_) => "Could not read or hash the file".to_string(),
            AppError::ScanUnavailable(_) => {
                "Could not retrieve scan results from VirusTotal".to_string()
            }
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "An internal server error occurred.".to_string()
            }
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::InvalidInput(_) | AppError::NotFound(_) => LogLevel::Debug,
            AppError::PayloadTooLarge(_) | AppError::ScanUnavailable(_) => LogLevel::Warn,
            AppError::HashingFailed(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => LogLevel::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_unavailable_hides_cause_from_client() {
        let err: AppError = ScanError::DeadlineExceeded { waited_secs: 120 }.into();
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(
            err.client_message(),
            "Could not retrieve scan results from VirusTotal"
        );
        assert!(err.to_string().contains("120"));
    }

    #[test]
    fn input_errors_are_client_errors() {
        let err = AppError::InvalidInput("No file selected".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.client_message(), "No file selected");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn hashing_failure_message() {
        let err = AppError::HashingFailed(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Could not read or hash the file");
        assert_eq!(err.error_code(), "HASHING_FAILED");
    }

    #[test]
    fn internal_errors_are_generic() {
        let err: AppError = anyhow::anyhow!("disk on fire").into();
        assert_eq!(err.client_message(), "An internal server error occurred.");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn scan_error_causes_are_distinct() {
        let causes = [
            ScanError::NotFound.cause(),
            ScanError::Transport("reset".into()).cause(),
            ScanError::DeadlineExceeded { waited_secs: 1 }.cause(),
            ScanError::Rejected { status: 401 }.cause(),
            ScanError::MalformedResponse("x".into()).cause(),
            ScanError::Cancelled.cause(),
        ];
        let mut unique = causes.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), causes.len());
    }
}
