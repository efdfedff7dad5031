//! Application setup and initialization
//!
//! Everything main.rs needs to turn a [`Config`] into a running router, kept
//! here so tests can build the same router around a stub scan provider.

pub mod routes;
pub mod server;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use malscan_core::Config;
use malscan_services::{ScanProvider, VirusTotalClient};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Create the reports and uploads directories.
pub fn prepare_directories(config: &Config) -> Result<()> {
    for dir in [config.reports_dir(), config.uploads_dir()] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    tracing::info!(reports_dir = %config.reports_dir().display(), "Reports directory ready");
    tracing::info!(base_dir = %config.base_dir.display(), "Base path");
    Ok(())
}

/// Build state and router around an already-constructed scan provider.
pub fn build_app(
    config: Config,
    scanner: Arc<dyn ScanProvider>,
    shutdown: CancellationToken,
) -> Result<(Arc<AppState>, axum::Router)> {
    prepare_directories(&config)?;
    let state = Arc::new(AppState::new(config, scanner, shutdown));
    let router = routes::setup_routes(&state.config, state.clone())?;
    Ok((state, router))
}

/// Initialize the entire application
pub async fn initialize_app(
    config: Config,
    shutdown: CancellationToken,
) -> Result<(Arc<AppState>, axum::Router)> {
    // Telemetry first so validation warnings reach the log file
    malscan_infra::init_telemetry(&config).context("Failed to initialize telemetry")?;

    validation::validate_config(&config).context("Configuration validation failed")?;
    tracing::info!("Configuration loaded and validated successfully");

    let scanner: Arc<dyn ScanProvider> = Arc::new(VirusTotalClient::new(&config.scan)?);
    build_app(config, scanner, shutdown)
}
