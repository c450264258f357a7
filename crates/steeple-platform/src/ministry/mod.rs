//! Ministry Aggregate

pub mod api;
pub mod entity;

pub use api::{ministries_router, MinistriesState};
pub use entity::Ministry;
