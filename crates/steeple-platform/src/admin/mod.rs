//! Admin Aggregate
//!
//! Site administrators. Admins authenticate with email/password and hold
//! every mutating permission in the content registry and ledger.

pub mod api;
pub mod entity;

pub use api::{admin_auth_router, AdminState};
pub use entity::Admin;
