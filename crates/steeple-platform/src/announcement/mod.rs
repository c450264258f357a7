//! Announcement Aggregate
//!
//! Announcements flagged urgent feed the site banner, limited to their
//! optional `scheduled_start`..`scheduled_end` window.

pub mod api;
pub mod entity;

pub use api::{announcements_router, AnnouncementsState};
pub use entity::Announcement;
