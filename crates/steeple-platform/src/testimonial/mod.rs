//! Testimonials

pub mod api;
pub mod entity;

pub use api::{testimonials_router, TestimonialsState};
pub use entity::Testimonial;
