//! Malscan infrastructure: process-wide telemetry setup.

pub mod telemetry;

pub use telemetry::{init_telemetry, shutdown_telemetry, DEFAULT_FILTER};
