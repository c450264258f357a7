//! Subscribers

pub mod api;
pub mod entity;

pub use api::{subscribers_router, SubscribersState};
pub use entity::Subscriber;
