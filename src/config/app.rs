//! Application settings.
//!
//! Knobs live in `config.toml` (optional; every field has a default). The sidecar
//! shared secret is never stored in the file: it is read from `SHARED_SECRET_KEY`
//! once at startup and handed to the sidecar explicitly.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable holding the sidecar signing secret.
pub const SHARED_SECRET_ENV: &str = "SHARED_SECRET_KEY";

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "CLASSBOOK_CONFIG";

/// Top-level structure of config.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Sidecar validation settings
    pub sidecar: SidecarSettings,
    /// Report formatting settings
    pub reports: ReportSettings,
}

/// Settings for the validation sidecar.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SidecarSettings {
    /// Student codes that may never be admitted
    pub reserved_student_codes: Vec<String>,
    /// Lifetime of issued tokens in seconds
    pub token_ttl_secs: i64,
}

impl Default for SidecarSettings {
    fn default() -> Self {
        Self {
            reserved_student_codes: vec!["123".to_string()],
            token_ttl_secs: 300,
        }
    }
}

impl SidecarSettings {
    /// Checks the settings are usable for issuing tokens.
    ///
    /// # Errors
    /// `Error::Config` when `token_ttl_secs` is not positive.
    pub fn validate(&self) -> Result<()> {
        if self.token_ttl_secs <= 0 {
            return Err(Error::Config {
                message: format!(
                    "sidecar.token_ttl_secs must be positive, got {}",
                    self.token_ttl_secs
                ),
            });
        }
        Ok(())
    }
}

/// Settings for reports shown by the bot.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// How many recent payments `/student info` lists
    pub recent_payments: u64,
    /// How many trailing months feed the revenue forecast (0 = all)
    pub forecast_window_months: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            recent_payments: 5,
            forecast_window_months: 12,
        }
    }
}

/// Parses an [`AppConfig`] from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.sidecar.validate()?;
    Ok(config)
}

/// Loads the config file at `path`, falling back to defaults when it does not exist.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    debug!("Loading configuration from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `CLASSBOOK_CONFIG` or `./config.toml`.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}

/// Reads the sidecar secret from the environment.
///
/// # Errors
/// Returns `Error::Config` when the variable is unset or blank.
pub fn load_shared_secret() -> Result<String> {
    match std::env::var(SHARED_SECRET_ENV) {
        Ok(secret) if !secret.trim().is_empty() => Ok(secret),
        _ => Err(Error::Config {
            message: format!("No {SHARED_SECRET_ENV} set in the environment"),
        }),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [sidecar]
            reserved_student_codes = ["123", "000"]
            token_ttl_secs = 60

            [reports]
            recent_payments = 3
            forecast_window_months = 6
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.sidecar.reserved_student_codes, vec!["123", "000"]);
        assert_eq!(config.sidecar.token_ttl_secs, 60);
        assert_eq!(config.reports.recent_payments, 3);
        assert_eq!(config.reports.forecast_window_months, 6);
    }

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let config = parse_config("[reports]\nrecent_payments = 10\n").unwrap();
        assert_eq!(config.reports.recent_payments, 10);
        assert_eq!(config.reports.forecast_window_months, 12);
        assert_eq!(config.sidecar.reserved_student_codes, vec!["123"]);
        assert_eq!(config.sidecar.token_ttl_secs, 300);
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = parse_config("[sidecar\nreserved = ");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_non_positive_token_ttl_rejected() {
        for ttl in ["0", "-30"] {
            let result = parse_config(&format!("[sidecar]\ntoken_ttl_secs = {ttl}\n"));
            assert!(matches!(result, Err(Error::Config { .. })), "ttl {ttl}");
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = load_config("definitely/not/here/config.toml").unwrap();
        assert_eq!(config.reports.recent_payments, 5);
    }
}
