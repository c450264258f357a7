//! Boundary validation helpers shared by the public write paths.

use regex::Regex;
use std::sync::OnceLock;

use crate::shared::error::{PlatformError, Result};

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

/// Trim, lowercase and check an email address.
pub fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email_pattern().is_match(&email) {
        Ok(email)
    } else {
        Err(PlatformError::validation(format!("Invalid email address: {}", email)))
    }
}

/// Optional variant of [`normalize_email`]; blank input counts as absent.
pub fn normalize_optional_email(email: Option<&str>) -> Result<Option<String>> {
    match email.map(str::trim).filter(|e| !e.is_empty()) {
        Some(e) => normalize_email(e).map(Some),
        None => Ok(None),
    }
}

/// Reject blank required text fields.
pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(PlatformError::validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}
