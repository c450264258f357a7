//! Foundation Ledger Integration Tests
//!
//! Concurrent donations against the in-memory store: the raised total
//! must always equal the sum of recorded donations.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use steeple_platform::foundation::{DonationIntent, FoundationLedger, NewFoundation};
use steeple_platform::{DocumentStore, MemoryStore, Money, PlatformError, Repository};

fn ledger() -> FoundationLedger {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    FoundationLedger::new(Repository::new(store.clone()), Repository::new(store))
}

fn building_fund() -> NewFoundation {
    NewFoundation {
        brand_id: "grace".into(),
        title: "Building Fund".into(),
        description: "New roof".into(),
        image_url: String::new(),
        gallery_images: Vec::new(),
        goal_amount: Some(Decimal::from(1000)),
    }
}

fn gift(foundation_id: &str, donor: &str, amount: &str) -> DonationIntent {
    DonationIntent {
        foundation_id: foundation_id.into(),
        donor_name: donor.into(),
        donor_email: format!("{}@example.org", donor.to_lowercase()),
        amount: Decimal::from_str(amount).unwrap(),
        message: None,
    }
}

mod scenario_tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sequential_then_concurrent_gifts() {
        let ledger = ledger();
        let fund = ledger.create_foundation(building_fund()).await.unwrap();

        ledger.donate(gift(&fund.id, "Alice", "250")).await.unwrap();
        assert_eq!(
            ledger.get_foundation(&fund.id).await.unwrap().raised_amount,
            Money::from_cents(25_000)
        );

        let (bob, carol) = tokio::join!(
            ledger.donate(gift(&fund.id, "Bob", "100")),
            ledger.donate(gift(&fund.id, "Carol", "50")),
        );
        bob.unwrap();
        carol.unwrap();

        let fund = ledger.get_foundation(&fund.id).await.unwrap();
        assert_eq!(fund.raised_amount, Money::from_cents(40_000));
        assert_eq!(fund.goal_amount, Some(Money::from_cents(100_000)));

        let donations = ledger.list_donations(&fund.id).await.unwrap();
        assert_eq!(donations.len(), 3);
        assert!(donations.iter().all(|d| d.brand_id == "grace"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_concurrent_gifts_sum_exactly() {
        let ledger = ledger();
        let fund = ledger.create_foundation(building_fund()).await.unwrap();

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let ledger = ledger.clone();
                let id = fund.id.clone();
                tokio::spawn(async move { ledger.donate(gift(&id, &format!("Donor{}", i), "0.10")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let fund = ledger.get_foundation(&fund.id).await.unwrap();
        let donations = ledger.list_donations(&fund.id).await.unwrap();
        let recorded: Money = donations.iter().map(|d| d.amount).sum();

        assert_eq!(donations.len(), 50);
        assert_eq!(fund.raised_amount, Money::from_cents(500));
        assert_eq!(fund.raised_amount, recorded);
    }
}

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_foundation_has_no_side_effects() {
        let ledger = ledger();
        let fund = ledger.create_foundation(building_fund()).await.unwrap();

        let err = ledger.donate(gift("missing", "Dan", "20")).await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));

        assert!(ledger.list_donations("missing").await.unwrap().is_empty());
        assert!(ledger.list_donations(&fund.id).await.unwrap().is_empty());
        assert_eq!(ledger.get_foundation(&fund.id).await.unwrap().raised_amount, Money::ZERO);
    }

    #[tokio::test]
    async fn test_missing_donor_name_rejected() {
        let ledger = ledger();
        let fund = ledger.create_foundation(building_fund()).await.unwrap();

        let mut anonymous = gift(&fund.id, "Eve", "5");
        anonymous.donor_name = "  ".into();
        let err = ledger.donate(anonymous).await.unwrap_err();

        assert!(matches!(err, PlatformError::Validation { .. }));
        assert_eq!(ledger.get_foundation(&fund.id).await.unwrap().raised_amount, Money::ZERO);
    }
}
