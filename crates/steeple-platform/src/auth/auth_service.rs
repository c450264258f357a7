//! Authentication Service
//!
//! Bearer token issuance and validation for admins and members.
//! Tokens are HMAC-signed JWTs (HS256/384/512).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

use crate::shared::error::{PlatformError, Result};

/// Principal kind carried in the token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Principal ID
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Configuration for the auth service
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub algorithm: Algorithm,
    pub token_expiry_hours: i64,
}

impl AuthConfig {
    pub fn from_settings(settings: &steeple_config::AuthConfig) -> Result<Self> {
        let algorithm = Algorithm::from_str(&settings.jwt_algorithm)
            .map_err(|_| PlatformError::configuration(format!("Unknown JWT algorithm {}", settings.jwt_algorithm)))?;

        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(PlatformError::configuration(format!(
                "JWT algorithm {} is not an HMAC algorithm",
                settings.jwt_algorithm
            )));
        }

        Ok(Self {
            secret_key: settings.jwt_secret.clone(),
            algorithm,
            token_expiry_hours: settings.token_expiry_hours,
        })
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            algorithm: Algorithm::HS256,
            token_expiry_hours: 24,
        }
    }
}

/// Authentication service for token management
pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());

        info!(algorithm = ?config.algorithm, expiry_hours = config.token_expiry_hours, "AuthService initialized");

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a token for a principal
    pub fn issue_token(&self, subject: &str, email: &str, role: Role) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.config.token_expiry_hours);

        let claims = TokenClaims {
            sub: subject.to_string(),
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &TokenClaims) -> Result<String> {
        encode(&Header::new(self.config.algorithm), claims, &self.encoding_key)
            .map_err(|e| PlatformError::internal(format!("Failed to encode JWT: {}", e)))
    }

    /// Validate a token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims> {
        let validation = Validation::new(self.config.algorithm);

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => PlatformError::TokenExpired,
                _ => PlatformError::InvalidToken { message: e.to_string() },
            })
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(AuthConfig {
            secret_key: "test-secret".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_issue_and_validate() {
        let service = service();
        let token = service.issue_token("m-1", "grace@church.org", Role::Member).unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "m-1");
        assert_eq!(claims.email, "grace@church.org");
        assert_eq!(claims.role, Role::Member);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_expired_token() {
        let service = service();
        let past = Utc::now() - Duration::hours(2);
        let token = service
            .encode_claims(&TokenClaims {
                sub: "a-1".into(),
                email: "admin@church.org".into(),
                role: Role::Admin,
                iat: (past - Duration::hours(1)).timestamp(),
                exp: past.timestamp(),
            })
            .unwrap();

        assert!(matches!(service.validate_token(&token), Err(PlatformError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue_token("a-1", "admin@church.org", Role::Admin).unwrap();
        let other = AuthService::new(AuthConfig {
            secret_key: "another-secret".to_string(),
            ..Default::default()
        });

        assert!(matches!(other.validate_token(&token), Err(PlatformError::InvalidToken { .. })));
    }

    #[test]
    fn test_config_from_settings() {
        let mut settings = steeple_config::AuthConfig {
            jwt_secret: "s".into(),
            jwt_algorithm: "HS512".into(),
            ..Default::default()
        };
        let config = AuthConfig::from_settings(&settings).unwrap();
        assert_eq!(config.algorithm, Algorithm::HS512);

        settings.jwt_algorithm = "RS256".into();
        assert!(AuthConfig::from_settings(&settings).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }
}
