//! Payment Session Manager
//!
//! Online giving through a hosted checkout provider. Each session is
//! tracked by a local [`PaymentTransaction`] that is reconciled by
//! polling or webhook and settles into a terminal state exactly once.

pub mod api;
pub mod entity;
pub mod provider;
pub mod service;
pub mod stripe;

pub use api::{payments_router, PaymentsState};
pub use entity::{PaymentStatus, PaymentTransaction, TransactionStatus};
pub use provider::{
    CheckoutProvider, CheckoutSession, CheckoutSessionRequest, ProviderPaymentStatus, WebhookOutcome,
};
pub use service::{CheckoutIntent, CheckoutOrigin, PaymentService, PaymentStats};
pub use stripe::{StripeCheckout, StripeConfig};
