//! Event Aggregate
//!
//! Events and their attendee registrations.

pub mod api;
pub mod entity;

pub use api::{events_router, EventsState};
pub use entity::{Event, EventAttendee};
