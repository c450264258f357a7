//! Volunteer Applications

pub mod api;
pub mod entity;

pub use api::{volunteers_router, VolunteerApplicationResponse, VolunteersState};
pub use entity::VolunteerApplication;
