//! Brand Aggregate

pub mod api;
pub mod entity;

pub use api::{brands_router, BrandsState};
pub use entity::Brand;
