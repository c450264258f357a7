//! Volunteer Application Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_record;

/// Status assigned to every new application
pub const NEW_APPLICATION_STATUS: &str = "new";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolunteerApplication {
    #[serde(rename = "_id")]
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Ministry the applicant wants to serve in
    pub ministry: String,
    pub availability: String,
    pub skills: Option<String>,
    pub message: Option<String>,
    /// Free-form workflow status set by admins
    pub status: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl_record!(VolunteerApplication, "volunteer_applications");
