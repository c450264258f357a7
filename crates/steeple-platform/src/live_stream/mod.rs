//! Live Streams

pub mod api;
pub mod entity;

pub use api::{live_streams_router, LiveStreamsState};
pub use entity::LiveStream;
