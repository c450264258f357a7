//! Foundation Ledger
//!
//! Sole writer of `Foundation::raised_amount`. A donation is persisted
//! and the running total incremented as one atomic store operation, so
//! the total always equals the sum of the foundation's donations no
//! matter how concurrent gifts interleave.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use super::entity::{Foundation, FoundationDonation, DONATION_COMPLETED};
use crate::shared::error::{PlatformError, Result};
use crate::shared::money::Money;
use crate::shared::validation::{normalize_email, require_text};
use crate::store::{Filter, FindOptions, Increment, Record, Repository};

/// Bound on public foundation listings
pub const FOUNDATION_LIST_LIMIT: i64 = 100;

/// Bound on a foundation's donation listing
pub const DONATION_LIST_LIMIT: i64 = 1000;

/// Fields an admin supplies for a new foundation
#[derive(Debug, Clone)]
pub struct NewFoundation {
    pub brand_id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub gallery_images: Vec<String>,
    pub goal_amount: Option<Decimal>,
}

/// A gift as submitted by a donor
#[derive(Debug, Clone)]
pub struct DonationIntent {
    pub foundation_id: String,
    pub donor_name: String,
    pub donor_email: String,
    pub amount: Decimal,
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct FoundationLedger {
    foundations: Repository<Foundation>,
    donations: Repository<FoundationDonation>,
}

impl FoundationLedger {
    pub fn new(foundations: Repository<Foundation>, donations: Repository<FoundationDonation>) -> Self {
        Self { foundations, donations }
    }

    /// Newest first, bounded; no pagination.
    pub async fn list_foundations(&self, brand_id: Option<&str>, is_active: Option<bool>) -> Result<Vec<Foundation>> {
        self.foundations
            .find(
                Filter::new().brand(brand_id).eq_opt("is_active", is_active),
                FindOptions::newest_first(FOUNDATION_LIST_LIMIT),
            )
            .await
    }

    pub async fn get_foundation(&self, id: &str) -> Result<Foundation> {
        self.foundations
            .find_by_id(id)
            .await?
            .ok_or_else(|| PlatformError::not_found("Foundation", id))
    }

    pub async fn create_foundation(&self, input: NewFoundation) -> Result<Foundation> {
        require_text("brand_id", &input.brand_id)?;
        require_text("title", &input.title)?;
        let goal_amount = input.goal_amount.map(Money::from_decimal).transpose()?;

        let foundation = Foundation {
            id: uuid::Uuid::new_v4().to_string(),
            brand_id: input.brand_id,
            title: input.title,
            description: input.description,
            image_url: input.image_url,
            gallery_images: input.gallery_images,
            goal_amount,
            raised_amount: Money::ZERO,
            is_active: true,
            created_at: Utc::now(),
        };
        self.foundations.insert(&foundation).await?;

        info!(foundation_id = %foundation.id, brand_id = %foundation.brand_id, "Foundation created");
        Ok(foundation)
    }

    /// Record a completed gift and add it to the foundation's total.
    pub async fn donate(&self, intent: DonationIntent) -> Result<FoundationDonation> {
        let foundation = self.get_foundation(&intent.foundation_id).await?;

        let amount = Money::from_decimal(intent.amount)?;
        require_text("donor_name", &intent.donor_name)?;
        let donor_email = normalize_email(&intent.donor_email)?;

        let donation = FoundationDonation {
            id: uuid::Uuid::new_v4().to_string(),
            foundation_id: foundation.id.clone(),
            brand_id: foundation.brand_id,
            donor_name: intent.donor_name.trim().to_string(),
            donor_email,
            amount,
            message: intent.message,
            payment_status: DONATION_COMPLETED.to_string(),
            created_at: Utc::now(),
        };

        let increment = Increment::new(
            Foundation::collection_name(),
            Filter::id(&foundation.id).into_document(),
            "raised_amount",
            amount.cents(),
        );
        let recorded = self
            .donations
            .store()
            .insert_and_increment(
                FoundationDonation::collection_name(),
                Repository::<FoundationDonation>::to_document(&donation)?,
                increment,
            )
            .await?;

        if !recorded {
            warn!(foundation_id = %foundation.id, "Foundation disappeared before donation was recorded");
            return Err(PlatformError::not_found("Foundation", &foundation.id));
        }

        info!(
            donation_id = %donation.id,
            foundation_id = %donation.foundation_id,
            amount = %donation.amount,
            "Foundation donation recorded"
        );
        Ok(donation)
    }

    /// A foundation's donations, newest first.
    pub async fn list_donations(&self, foundation_id: &str) -> Result<Vec<FoundationDonation>> {
        self.donations
            .find(
                Filter::new().eq("foundation_id", foundation_id),
                FindOptions::newest_first(DONATION_LIST_LIMIT),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentStore, MemoryStore};
    use std::str::FromStr;
    use std::sync::Arc;

    fn ledger() -> FoundationLedger {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        FoundationLedger::new(Repository::new(store.clone()), Repository::new(store))
    }

    fn new_foundation(brand: &str) -> NewFoundation {
        NewFoundation {
            brand_id: brand.into(),
            title: "New Roof".into(),
            description: "Replace the sanctuary roof".into(),
            image_url: "https://img.example.org/roof.jpg".into(),
            gallery_images: vec![],
            goal_amount: Some(Decimal::from(1000)),
        }
    }

    fn intent(foundation_id: &str, amount: &str) -> DonationIntent {
        DonationIntent {
            foundation_id: foundation_id.into(),
            donor_name: "Lydia".into(),
            donor_email: "lydia@example.org".into(),
            amount: Decimal::from_str(amount).unwrap(),
            message: None,
        }
    }

    #[tokio::test]
    async fn test_create_starts_at_zero() {
        let ledger = ledger();
        let foundation = ledger.create_foundation(new_foundation("b1")).await.unwrap();

        assert_eq!(foundation.raised_amount, Money::ZERO);
        assert_eq!(foundation.goal_amount, Some(Money::from_cents(100_000)));
        assert!(foundation.is_active);
    }

    #[tokio::test]
    async fn test_donate_increments_total() {
        let ledger = ledger();
        let foundation = ledger.create_foundation(new_foundation("b1")).await.unwrap();

        let donation = ledger.donate(intent(&foundation.id, "19.99")).await.unwrap();
        assert_eq!(donation.payment_status, "completed");
        assert_eq!(donation.brand_id, "b1");

        ledger.donate(intent(&foundation.id, "0.01")).await.unwrap();

        let refreshed = ledger.get_foundation(&foundation.id).await.unwrap();
        assert_eq!(refreshed.raised_amount, Money::from_cents(2_000));
    }

    #[tokio::test]
    async fn test_invalid_amount_leaves_total_untouched() {
        let ledger = ledger();
        let foundation = ledger.create_foundation(new_foundation("b1")).await.unwrap();

        for bad in ["0", "-5", "1.001"] {
            let err = ledger.donate(intent(&foundation.id, bad)).await.unwrap_err();
            assert!(matches!(err, PlatformError::Validation { .. }), "{} accepted", bad);
        }

        let refreshed = ledger.get_foundation(&foundation.id).await.unwrap();
        assert_eq!(refreshed.raised_amount, Money::ZERO);
        assert!(ledger.list_donations(&foundation.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let ledger = ledger();
        let foundation = ledger.create_foundation(new_foundation("b1")).await.unwrap();

        let mut bad = intent(&foundation.id, "10");
        bad.donor_email = "nobody".into();
        assert!(ledger.donate(bad).await.is_err());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let ledger = ledger();
        ledger.create_foundation(new_foundation("north")).await.unwrap();
        ledger.create_foundation(new_foundation("south")).await.unwrap();

        assert_eq!(ledger.list_foundations(Some("north"), None).await.unwrap().len(), 1);
        assert_eq!(ledger.list_foundations(None, None).await.unwrap().len(), 2);
        assert_eq!(ledger.list_foundations(None, Some(false)).await.unwrap().len(), 0);
    }
}
