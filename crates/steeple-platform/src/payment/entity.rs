//! Payment Transaction Entity

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::provider::ProviderPaymentStatus;
use crate::impl_record;
use crate::shared::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Expired,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Initiated,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Initiated => "initiated",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        }
    }
}

/// Local record of one hosted checkout session.
///
/// Created `pending`/`initiated`; settles once into a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTransaction {
    #[serde(rename = "_id")]
    pub id: String,
    pub session_id: String,
    pub brand_id: String,
    pub amount: Money,
    pub currency: String,
    pub category: String,
    pub category_id: Option<String>,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub donor_name: Option<String>,
    pub payment_status: PaymentStatus,
    pub status: TransactionStatus,
    /// Copy of the metadata sent to the provider
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl PaymentTransaction {
    /// Fold a provider report into this record.
    ///
    /// Returns `false` when the record is already terminal, in which case
    /// nothing changes. A pending report only refreshes `updated_at`.
    pub fn apply(&mut self, reported: ProviderPaymentStatus, now: DateTime<Utc>) -> bool {
        if self.payment_status.is_terminal() {
            return false;
        }

        let (payment_status, status) = match reported {
            ProviderPaymentStatus::Pending => (PaymentStatus::Pending, self.status),
            ProviderPaymentStatus::Paid => (PaymentStatus::Paid, TransactionStatus::Completed),
            ProviderPaymentStatus::Failed => (PaymentStatus::Failed, TransactionStatus::Failed),
            ProviderPaymentStatus::Expired => (PaymentStatus::Expired, TransactionStatus::Failed),
        };
        self.payment_status = payment_status;
        self.status = status;
        self.updated_at = now;
        true
    }
}

impl_record!(PaymentTransaction, "payment_transactions");
