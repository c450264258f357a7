//! Photo Gallery

pub mod api;
pub mod entity;

pub use api::{gallery_router, GalleryState};
pub use entity::GalleryImage;
