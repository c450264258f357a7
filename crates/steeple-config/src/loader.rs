//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "steeple.toml",
    "./config/config.toml",
    "/etc/steeple/config.toml",
];

/// Environment variable naming an explicit config file
const CONFIG_PATH_VAR: &str = "STEEPLE_CONFIG";

/// Configuration loader
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        apply_overrides(&mut config, |key| env::var(key).ok());

        Ok(config)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
            warn!(?path, "Configured config file does not exist, searching defaults");
        }

        if let Ok(path) = env::var(CONFIG_PATH_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

/// Apply `STEEPLE_*` overrides read through `lookup`.
/// Unparseable numeric/boolean values are skipped.
pub(crate) fn apply_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(val) = lookup("STEEPLE_HTTP_HOST") {
        config.http.host = val;
    }
    parse_into(&lookup, "STEEPLE_HTTP_PORT", &mut config.http.port);
    if let Some(val) = lookup("STEEPLE_CORS_ORIGINS") {
        config.http.cors_origins = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    // MongoDB
    if let Some(val) = lookup("STEEPLE_MONGODB_URI") {
        config.mongodb.uri = val;
    }
    if let Some(val) = lookup("STEEPLE_MONGODB_DATABASE") {
        config.mongodb.database = val;
    }

    // Auth
    if let Some(val) = lookup("STEEPLE_JWT_SECRET") {
        config.auth.jwt_secret = val;
    }
    if let Some(val) = lookup("STEEPLE_JWT_ALGORITHM") {
        config.auth.jwt_algorithm = val.to_uppercase();
    }
    parse_into(&lookup, "STEEPLE_JWT_EXPIRY_HOURS", &mut config.auth.token_expiry_hours);
    parse_into(&lookup, "STEEPLE_MIN_PASSWORD_LENGTH", &mut config.auth.min_password_length);

    // Payments
    if let Some(val) = lookup("STEEPLE_STRIPE_API_KEY") {
        config.payments.stripe_api_key = val;
    }
    if let Some(val) = lookup("STEEPLE_STRIPE_WEBHOOK_SECRET") {
        config.payments.stripe_webhook_secret = val;
    }
    if let Some(val) = lookup("STEEPLE_STRIPE_API_BASE") {
        config.payments.stripe_api_base = val;
    }
    if let Some(val) = lookup("STEEPLE_CURRENCY") {
        config.payments.currency = val.to_lowercase();
    }
    parse_into(&lookup, "STEEPLE_PAYMENT_TIMEOUT_SECS", &mut config.payments.request_timeout_secs);
    parse_into(&lookup, "STEEPLE_WEBHOOK_TOLERANCE_SECS", &mut config.payments.webhook_tolerance_secs);

    parse_into(&lookup, "STEEPLE_DEV_MODE", &mut config.dev_mode);
}

fn parse_into<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => warn!(key, value = %raw, "Ignoring unparseable environment override"),
        }
    }
}
