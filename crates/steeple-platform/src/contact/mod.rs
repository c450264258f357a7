//! Contact Messages

pub mod api;
pub mod entity;

pub use api::{contact_router, ContactState};
pub use entity::ContactMessage;
