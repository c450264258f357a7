//! Contact Message Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_record;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl_record!(ContactMessage, "contact_messages");
