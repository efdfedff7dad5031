//! Configuration validation
//!
//! Validates configuration at startup to catch misconfigurations early.

use anyhow::Result;
use malscan_core::Config;

/// Validate configuration values.
///
/// A missing VirusTotal key is logged but tolerated; lookups will then be
/// rejected by the service and surface as scan failures per request.
pub fn validate_config(config: &Config) -> Result<()> {
    if config.scan.api_key.is_none() {
        tracing::error!("VIRUSTOTAL_API_KEY is not set - scans will fail until it is configured");
    }

    if config.smtp.is_partial() {
        tracing::warn!(
            smtp_server = config.smtp.server.is_some(),
            email_sender = config.smtp.sender.is_some(),
            email_password = config.smtp.password.is_some(),
            "SMTP is only partially configured - report emails will fail"
        );
    }

    if config.is_production() && config.allows_any_origin() {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if config.scan.poll_interval_secs == 0 {
        return Err(anyhow::anyhow!("SCAN_POLL_INTERVAL_SECS cannot be 0"));
    }

    if config.max_upload_size_bytes == 0 {
        return Err(anyhow::anyhow!("Max upload size cannot be 0"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_source(|key| map.get(key).cloned()).unwrap()
    }

    #[test]
    fn development_defaults_pass() {
        let config = config_from(&[("BASE_DIR", "/tmp/malscan")]);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        let config = config_from(&[("BASE_DIR", "/tmp/malscan"), ("ENVIRONMENT", "production")]);
        assert!(validate_config(&config).is_err());

        let config = config_from(&[
            ("BASE_DIR", "/tmp/malscan"),
            ("ENVIRONMENT", "production"),
            ("CORS_ORIGINS", "https://scan.example.com"),
        ]);
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let config = config_from(&[("BASE_DIR", "/tmp/malscan"), ("SCAN_POLL_INTERVAL_SECS", "0")]);
        assert!(validate_config(&config).is_err());
    }
}
