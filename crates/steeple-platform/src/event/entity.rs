//! Event Entities

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_record;

/// A scheduled church event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    pub brand_id: String,
    pub title: String,
    pub description: String,
    /// Display date as entered by the admin (e.g. `2025-03-09`)
    pub date: String,
    pub time: Option<String>,
    pub location: String,
    pub is_free: bool,
    pub image_url: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl_record!(Event, "events");

/// A registration for an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAttendee {
    #[serde(rename = "_id")]
    pub id: String,
    pub event_id: String,
    /// Copied from the event at registration time
    pub brand_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Party size including the registrant
    pub guests: u32,
    pub notes: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl_record!(EventAttendee, "event_attendees");
