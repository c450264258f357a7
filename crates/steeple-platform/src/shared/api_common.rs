//! Common API types and utilities

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Upper bound for general list endpoints
pub const LIST_LIMIT: i64 = 1000;

/// Upper bound for public feeds and member-facing lists
pub const FEED_LIMIT: i64 = 100;

/// Optional tenant scope shared by most list endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BrandQuery {
    /// Restrict results to one brand; omitted returns every brand's data
    pub brand_id: Option<String>,
}

impl BrandQuery {
    pub fn brand(&self) -> Option<&str> {
        self.brand_id.as_deref().filter(|b| !b.is_empty())
    }
}

/// Single-field status change (`?status=...`)
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusQuery {
    pub status: String,
}

/// Plain acknowledgement body
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_brand_is_unscoped() {
        let query = BrandQuery { brand_id: Some(String::new()) };
        assert_eq!(query.brand(), None);

        let query = BrandQuery { brand_id: Some("b1".into()) };
        assert_eq!(query.brand(), Some("b1"));
    }
}
