//! Tracing initialization
//!
//! Console output plus an append-only log file recording lifecycle and error
//! events.

mod init_basic;

pub use init_basic::{init_telemetry, open_log_file, shutdown_telemetry, DEFAULT_FILTER};
