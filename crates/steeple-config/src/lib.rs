//! Steeple Configuration
//!
//! TOML-based configuration with environment variable overrides.
//! See [`ConfigLoader`] for the lookup order.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Token signing algorithms accepted for member/admin bearer tokens.
pub const SUPPORTED_JWT_ALGORITHMS: &[&str] = &["HS256", "HS384", "HS512"];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub mongodb: MongoConfig,
    pub auth: AuthConfig,
    pub payments: PaymentsConfig,

    /// Relaxes secret checks and allows the in-memory store (`memory://`)
    pub dev_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            mongodb: MongoConfig::default(),
            auth: AuthConfig::default(),
            payments: PaymentsConfig::default(),
            dev_mode: false,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// MongoDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "steeple".to_string(),
        }
    }
}

impl MongoConfig {
    /// `memory://` selects the in-process store (dev mode only)
    pub fn is_memory(&self) -> bool {
        self.uri.starts_with("memory://")
    }
}

/// Bearer token and password configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_algorithm: String,
    pub token_expiry_hours: i64,
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_algorithm: "HS256".to_string(),
            token_expiry_hours: 24,
            min_password_length: 8,
        }
    }
}

/// Checkout provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    pub stripe_api_key: String,
    pub stripe_webhook_secret: String,
    pub stripe_api_base: String,
    pub currency: String,
    pub request_timeout_secs: u64,
    pub webhook_tolerance_secs: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            stripe_webhook_secret: String::new(),
            stripe_api_base: "https://api.stripe.com".to_string(),
            currency: "usd".to_string(),
            request_timeout_secs: 15,
            webhook_tolerance_secs: 300,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Check values that would otherwise fail at first use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::ValidationError("http.port must be non-zero".into()));
        }

        if !SUPPORTED_JWT_ALGORITHMS.contains(&self.auth.jwt_algorithm.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "auth.jwt_algorithm must be one of {:?}, got {}",
                SUPPORTED_JWT_ALGORITHMS, self.auth.jwt_algorithm
            )));
        }

        if self.auth.token_expiry_hours <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.token_expiry_hours must be positive".into(),
            ));
        }

        if !self.dev_mode {
            if self.auth.jwt_secret.is_empty() {
                return Err(ConfigError::ValidationError(
                    "auth.jwt_secret is required outside dev mode".into(),
                ));
            }
            if self.mongodb.is_memory() {
                return Err(ConfigError::ValidationError(
                    "the in-memory store is only available in dev mode".into(),
                ));
            }
        }

        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Steeple Configuration
# Environment variables (STEEPLE_*) override these settings

[http]
host = "0.0.0.0"
port = 8001
cors_origins = ["*"]

[mongodb]
uri = "mongodb://localhost:27017/?replicaSet=rs0&directConnection=true"
database = "steeple"

[auth]
jwt_secret = "change-me"
jwt_algorithm = "HS256"
token_expiry_hours = 24
min_password_length = 8

[payments]
stripe_api_key = ""
stripe_webhook_secret = ""
stripe_api_base = "https://api.stripe.com"
currency = "usd"
request_timeout_secs = 15
webhook_tolerance_secs = 300

dev_mode = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_toml_parses() {
        let config: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        assert_eq!(config.http.port, 8001);
        assert_eq!(config.auth.jwt_algorithm, "HS256");
        assert_eq!(config.payments.currency, "usd");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str("[http]\nport = 9000\n").unwrap();
        assert_eq!(config.http.port, 9000);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.auth.token_expiry_hours, 24);
    }

    #[test]
    fn test_validate_requires_secret_outside_dev_mode() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_err());

        config.dev_mode = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_algorithm() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "secret".into();
        config.auth.jwt_algorithm = "RS256".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_memory_store_only_in_dev_mode() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "secret".into();
        config.mongodb.uri = "memory://".into();
        assert!(config.validate().is_err());

        config.dev_mode = true;
        assert!(config.validate().is_ok());
    }
}
