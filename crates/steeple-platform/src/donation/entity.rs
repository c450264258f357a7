//! Manual Donation Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_record;
use crate::shared::money::Money;

/// An offline gift (cash, cheque) recorded by an admin.
///
/// Independent from foundation donations and online payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    #[serde(rename = "_id")]
    pub id: String,
    pub brand_id: String,
    pub donor_name: String,
    pub donor_email: Option<String>,
    pub amount: Money,
    pub category: String,
    /// Date the gift was received, as entered
    pub date: String,
    pub notes: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl_record!(Donation, "donations");
