//! Member Aggregate

pub mod api;
pub mod entity;

pub use api::{members_router, MembersState};
pub use entity::Member;
