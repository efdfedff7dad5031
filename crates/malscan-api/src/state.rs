//! Application state shared by every handler.

use crate::services::email::EmailService;
use malscan_core::Config;
use malscan_services::{ReportRenderer, ScanProvider};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct AppState {
    pub config: Config,
    pub scanner: Arc<dyn ScanProvider>,
    pub reports: ReportRenderer,
    pub email: EmailService,
    /// Cancelled on shutdown; each scan polls under a child of this token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, scanner: Arc<dyn ScanProvider>, shutdown: CancellationToken) -> Self {
        let reports = ReportRenderer::new(config.reports_dir());
        let email = EmailService::new(config.smtp.clone());
        Self {
            config,
            scanner,
            reports,
            email,
            shutdown,
        }
    }
}
