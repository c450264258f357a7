//! Prayer Request Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::impl_record;
use crate::shared::error::PlatformError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrayerStatus {
    #[default]
    New,
    Praying,
    Answered,
}

impl PrayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerStatus::New => "new",
            PrayerStatus::Praying => "praying",
            PrayerStatus::Answered => "answered",
        }
    }
}

impl FromStr for PrayerStatus {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(PrayerStatus::New),
            "praying" => Ok(PrayerStatus::Praying),
            "answered" => Ok(PrayerStatus::Answered),
            other => Err(PlatformError::validation(format!(
                "Invalid prayer status '{}', expected new, praying or answered",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerRequest {
    #[serde(rename = "_id")]
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub email: Option<String>,
    pub request: String,
    /// Anonymous requests never appear on the public prayer wall
    pub is_anonymous: bool,
    pub status: PrayerStatus,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl_record!(PrayerRequest, "prayer_requests");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!("praying".parse::<PrayerStatus>().unwrap(), PrayerStatus::Praying);
        assert_eq!(" Answered ".parse::<PrayerStatus>().unwrap(), PrayerStatus::Answered);
        assert!("closed".parse::<PrayerStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PrayerStatus::New).unwrap(), "\"new\"");
        assert_eq!(PrayerStatus::Answered.as_str(), "answered");
    }
}
