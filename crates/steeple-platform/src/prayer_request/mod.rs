//! Prayer Requests

pub mod api;
pub mod entity;

pub use api::{prayer_requests_router, PrayerRequestResponse, PrayerRequestsState};
pub use entity::{PrayerRequest, PrayerStatus};
