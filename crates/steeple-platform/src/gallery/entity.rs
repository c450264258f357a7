//! Gallery Image Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_record;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    #[serde(rename = "_id")]
    pub id: String,
    pub brand_id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    /// Event the photo was taken at, if any
    pub event_id: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl_record!(GalleryImage, "gallery");
