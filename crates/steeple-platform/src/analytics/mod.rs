//! Analytics

pub mod api;

pub use api::{analytics_router, AnalyticsState};
