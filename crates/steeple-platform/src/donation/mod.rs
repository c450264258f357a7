//! Manual Donation Records

pub mod api;
pub mod entity;

pub use api::{donations_router, DonationsState};
pub use entity::Donation;
