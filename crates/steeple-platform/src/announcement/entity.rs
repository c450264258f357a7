//! Announcement Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_record;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(rename = "_id")]
    pub id: String,
    pub brand_id: String,
    pub title: String,
    pub content: String,
    pub is_urgent: bool,
    /// Not shown as urgent before this instant
    pub scheduled_start: Option<bson::DateTime>,
    /// Not shown as urgent after this instant
    pub scheduled_end: Option<bson::DateTime>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Announcement {
    /// Whether an urgent announcement belongs in the banner at `now`.
    /// Unscheduled bounds are open.
    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        let started = self.scheduled_start.map_or(true, |start| start.to_chrono() <= now);
        let not_ended = self.scheduled_end.map_or(true, |end| end.to_chrono() >= now);
        started && not_ended
    }
}

impl_record!(Announcement, "announcements");
