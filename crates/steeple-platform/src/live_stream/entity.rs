//! Live Stream Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_record;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveStream {
    #[serde(rename = "_id")]
    pub id: String,
    pub brand_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Embeddable stream URL (YouTube, Vimeo, ...)
    pub stream_url: String,
    pub thumbnail_url: Option<String>,
    pub is_live: bool,
    pub scheduled_time: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl_record!(LiveStream, "live_streams");
