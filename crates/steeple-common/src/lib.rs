//! Shared utilities for the Steeple services.

pub mod logging;

pub use logging::{init_default_logging, init_logging};
