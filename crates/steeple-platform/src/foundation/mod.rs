//! Foundation Ledger
//!
//! Fundraising campaigns and their append-only donation log.

pub mod api;
pub mod entity;
pub mod ledger;

pub use api::{foundations_router, FoundationsState};
pub use entity::{Foundation, FoundationDonation};
pub use ledger::{DonationIntent, FoundationLedger, NewFoundation};
