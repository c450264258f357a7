//! Shared infrastructure

pub mod api_common;
pub mod error;
pub mod middleware;
pub mod money;
pub mod validation;

pub use api_common::{BrandQuery, MessageResponse, StatusQuery, FEED_LIMIT, LIST_LIMIT};
pub use error::{ErrorResponse, PlatformError, Result};
pub use middleware::{AdminAuth, AuthLayer, AuthState, MemberAuth, OptionalMember};
pub use money::Money;
