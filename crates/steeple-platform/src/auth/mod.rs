//! Authentication
//!
//! Token and password services shared by the admin and member aggregates.

pub mod auth_service;
pub mod password_service;

pub use auth_service::{extract_bearer_token, AuthConfig, AuthService, Role, TokenClaims};
pub use password_service::{Argon2Config, PasswordPolicy, PasswordService};
