//! Steeple Platform
//!
//! Backend for multi-tenant church websites:
//! - Content registry (events, ministries, announcements, sermons, ...)
//! - Foundation ledger with an exact, atomically maintained raised total
//! - Online giving through a hosted checkout provider
//! - Admin and member identity
//! - Dashboard analytics
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Stored documents
//! - `api` - REST endpoints and DTOs
//! - a service (`ledger`, `service`) where the aggregate has rules beyond CRUD

// Identity
pub mod admin;
pub mod auth;
pub mod member;

// Content registry
pub mod announcement;
pub mod brand;
pub mod contact;
pub mod donation;
pub mod event;
pub mod gallery;
pub mod giving_category;
pub mod live_stream;
pub mod ministry;
pub mod prayer_request;
pub mod sermon;
pub mod subscriber;
pub mod testimonial;
pub mod volunteer;

// Giving
pub mod foundation;
pub mod payment;

pub mod analytics;

// Infrastructure
pub mod app;
pub mod shared;
pub mod store;

pub use app::{ApiDoc, PlatformServices};
pub use shared::error::{PlatformError, Result};
pub use shared::money::Money;
pub use store::{DocumentStore, MemoryStore, MongoStore, Repository};

pub use admin::Admin;
pub use foundation::{Foundation, FoundationDonation, FoundationLedger};
pub use member::Member;
pub use payment::{PaymentService, PaymentTransaction, StripeCheckout, StripeConfig};
