//! Member Entity
//!
//! A congregation member with a website login. Members own payment history
//! and can be deactivated by an admin, which revokes access on the next
//! request without invalidating issued tokens.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Record;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: String,

    /// Lowercased, unique
    pub email: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    pub brand_id: String,

    pub is_active: bool,

    /// Argon2id PHC string; never leaves the API layer
    pub password_hash: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        brand_id: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into(),
            name: name.into(),
            phone: None,
            brand_id: brand_id.into(),
            is_active: true,
            password_hash: password_hash.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_phone(mut self, phone: Option<String>) -> Self {
        self.phone = phone;
        self
    }
}

impl Record for Member {
    fn collection_name() -> &'static str {
        "members"
    }

    fn id(&self) -> &str {
        &self.id
    }
}
