//! Giving Category Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_record;

/// A fund donors can give to online (General, Building, Missions, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GivingCategory {
    #[serde(rename = "_id")]
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl_record!(GivingCategory, "giving_categories");
