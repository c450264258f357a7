//! Giving Categories

pub mod api;
pub mod entity;

pub use api::{giving_categories_router, GivingCategoriesState};
pub use entity::GivingCategory;
