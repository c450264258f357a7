//! Foundation Entities

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_record;
use crate::shared::money::Money;

/// Every recorded foundation donation has already been received.
pub const DONATION_COMPLETED: &str = "completed";

/// A fundraising campaign.
///
/// `raised_amount` is owned by the ledger: it starts at zero and only
/// moves through [`FoundationLedger::donate`](super::FoundationLedger::donate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Foundation {
    #[serde(rename = "_id")]
    pub id: String,
    pub brand_id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub gallery_images: Vec<String>,
    pub goal_amount: Option<Money>,
    pub raised_amount: Money,
    pub is_active: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl_record!(Foundation, "foundations");

/// Immutable record of one gift to a foundation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoundationDonation {
    #[serde(rename = "_id")]
    pub id: String,
    pub foundation_id: String,
    /// Copied from the foundation
    pub brand_id: String,
    pub donor_name: String,
    pub donor_email: String,
    pub amount: Money,
    pub message: Option<String>,
    pub payment_status: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl_record!(FoundationDonation, "foundation_donations");
