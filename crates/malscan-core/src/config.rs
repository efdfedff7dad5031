//! Configuration module
//!
//! Every setting the service needs is read once at startup into [`Config`] and
//! handed to each component's constructor. Nothing downstream touches the
//! process environment.

use std::env;
use std::path::{Path, PathBuf};

// Common constants
const SERVER_PORT: u16 = 5000;
const SMTP_PORT: u16 = 587;
const SCAN_POLL_INTERVAL_SECS: u64 = 15;
const SCAN_MAX_WAIT_SECS: u64 = 120;
const MAX_UPLOAD_SIZE_MB: usize = 32;
const VIRUSTOTAL_BASE_URL: &str = "https://www.virustotal.com/api/v3";
const LOG_FILE_NAME: &str = "sandbox_analysis.log";

/// Settings for the external malware-intelligence service.
#[derive(Clone, Debug)]
pub struct ScanServiceConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub poll_interval_secs: u64,
    pub max_wait_secs: u64,
}

/// Mail-submission settings. Every field is optional; the notifier refuses to
/// connect unless server, sender and password are all present.
#[derive(Clone, Debug, Default)]
pub struct SmtpConfig {
    pub server: Option<String>,
    pub port: u16,
    pub sender: Option<String>,
    pub password: Option<String>,
}

impl SmtpConfig {
    pub fn is_configured(&self) -> bool {
        self.server.is_some() && self.sender.is_some() && self.password.is_some()
    }

    /// True when some but not all of the required settings are present.
    pub fn is_partial(&self) -> bool {
        let set = [
            self.server.is_some(),
            self.sender.is_some(),
            self.password.is_some(),
        ];
        set.iter().any(|s| *s) && !set.iter().all(|s| *s)
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub base_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub log_file: PathBuf,
    pub max_upload_size_bytes: usize,
    pub scan: ScanServiceConfig,
    pub smtp: SmtpConfig,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server_port = match var("PORT") {
            Some(p) => p
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => SERVER_PORT,
        };

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base_dir = match var("BASE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => env::current_dir()
                .map_err(|e| anyhow::anyhow!("Failed to resolve working directory: {}", e))?,
        };
        let reports_dir = var("REPORTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| base_dir.join("reports"));
        let uploads_dir = var("UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| base_dir.join("uploads"));
        let log_file = var("LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| base_dir.join(LOG_FILE_NAME));

        let max_upload_size_mb = var("MAX_UPLOAD_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_UPLOAD_SIZE_MB);
        let max_upload_size_bytes = max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large"))?;

        let scan = ScanServiceConfig {
            api_key: var("VIRUSTOTAL_API_KEY"),
            base_url: var("VIRUSTOTAL_BASE_URL")
                .unwrap_or_else(|| VIRUSTOTAL_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            poll_interval_secs: var("SCAN_POLL_INTERVAL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(SCAN_POLL_INTERVAL_SECS),
            max_wait_secs: var("SCAN_MAX_WAIT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(SCAN_MAX_WAIT_SECS),
        };

        let smtp = SmtpConfig {
            server: var("SMTP_SERVER"),
            port: var("SMTP_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(SMTP_PORT),
            sender: var("EMAIL_SENDER"),
            password: var("EMAIL_PASSWORD"),
        };

        Ok(Config {
            server_port,
            environment,
            cors_origins,
            base_dir,
            reports_dir,
            uploads_dir,
            log_file,
            max_upload_size_bytes,
            scan,
            smtp,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}
