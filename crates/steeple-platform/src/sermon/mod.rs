//! Sermons
//!
//! Recorded messages, published as video or audio.

pub mod api;
pub mod entity;

pub use api::{sermons_router, SermonsState};
pub use entity::Sermon;
