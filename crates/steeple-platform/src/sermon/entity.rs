//! Sermon Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_record;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sermon {
    #[serde(rename = "_id")]
    pub id: String,
    pub brand_id: String,
    pub title: String,
    pub description: String,
    pub speaker: String,
    /// Date the message was preached, as entered
    pub date: String,
    /// `video` or `audio`
    pub media_type: String,
    pub media_url: String,
    pub thumbnail_url: Option<String>,
    pub transcript: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl_record!(Sermon, "sermons");
