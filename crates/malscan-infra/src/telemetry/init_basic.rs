use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use malscan_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "malscan=info,tower_http=info";

/// Open (creating if needed) the service log file in append mode.
pub fn open_log_file(path: &Path) -> Result<File, anyhow::Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create log directory {}: {}",
                    parent.display(),
                    e
                )
            })?;
        }
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file {}: {}", path.display(), e))
}

/// Initialize tracing: `RUST_LOG`-driven filter, console layer and a
/// plain-text layer appending to `config.log_file`.
pub fn init_telemetry(config: &Config) -> Result<(), anyhow::Error> {
    let log_file = open_log_file(&config.log_file)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!(
        environment = %config.environment,
        log_file = %config.log_file.display(),
        "Application starting up..."
    );
    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::info!("Application shut down");
}
