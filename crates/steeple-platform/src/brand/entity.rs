//! Brand Entity
//!
//! A brand is one church website: the tenant boundary every other
//! aggregate is scoped by through its `brand_id`.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_record;

pub const DEFAULT_PRIMARY_COLOR: &str = "#1a1a1a";
pub const DEFAULT_SECONDARY_COLOR: &str = "#4a90e2";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub domain: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub tagline: Option<String>,
    pub hero_video_url: Option<String>,
    pub hero_image_url: Option<String>,
    pub service_times: Option<String>,
    pub location: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Brand {
    pub fn new(name: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            domain: domain.into(),
            logo_url: None,
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_string(),
            tagline: None,
            hero_video_url: None,
            hero_image_url: None,
            service_times: None,
            location: None,
            created_at: Utc::now(),
        }
    }
}

impl_record!(Brand, "brands");
