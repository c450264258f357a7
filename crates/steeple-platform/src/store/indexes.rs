//! Collection Indexes
//!
//! Unique keys are enforced by the store itself so that concurrent
//! writers cannot both claim the same email or checkout session.
//! [`MemoryStore`](super::MemoryStore) honours the same keys.

use bson::{doc, Document};
use mongodb::{options::IndexOptions, Database, IndexModel};
use tracing::info;

use super::Record;
use crate::admin::Admin;
use crate::event::entity::EventAttendee;
use crate::foundation::FoundationDonation;
use crate::member::Member;
use crate::payment::PaymentTransaction;

/// `(collection, field)` pairs whose values must be unique
pub fn unique_keys() -> [(&'static str, &'static str); 3] {
    [
        (Admin::collection_name(), "email"),
        (Member::collection_name(), "email"),
        (PaymentTransaction::collection_name(), "session_id"),
    ]
}

/// Unique fields declared for `collection`
pub fn unique_fields(collection: &str) -> impl Iterator<Item = &'static str> + '_ {
    unique_keys()
        .into_iter()
        .filter(move |(c, _)| *c == collection)
        .map(|(_, field)| field)
}

/// Create all indexes. Safe to run on every start.
pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    for (collection, field) in unique_keys() {
        let mut keys = Document::new();
        keys.insert(field, 1);
        db.collection::<Document>(collection)
            .create_index(
                IndexModel::builder()
                    .keys(keys)
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;
        info!(collection, field, "Created unique index");
    }

    let lookups = [
        (FoundationDonation::collection_name(), doc! { "foundation_id": 1, "created_at": -1 }),
        (EventAttendee::collection_name(), doc! { "event_id": 1 }),
        (PaymentTransaction::collection_name(), doc! { "user_id": 1, "created_at": -1 }),
        (PaymentTransaction::collection_name(), doc! { "brand_id": 1, "payment_status": 1 }),
    ];
    for (collection, keys) in lookups {
        db.collection::<Document>(collection)
            .create_index(IndexModel::builder().keys(keys).build())
            .await?;
    }

    info!("MongoDB indexes initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_fields_by_collection() {
        assert_eq!(unique_fields("members").collect::<Vec<_>>(), vec!["email"]);
        assert_eq!(unique_fields("payment_transactions").collect::<Vec<_>>(), vec!["session_id"]);
        assert_eq!(unique_fields("sermons").count(), 0);
    }
}
