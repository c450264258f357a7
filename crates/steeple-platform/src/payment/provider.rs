//! Checkout Provider seam
//!
//! [`PaymentService`](super::PaymentService) talks to the hosted checkout
//! through [`CheckoutProvider`]. [`StripeCheckout`](super::StripeCheckout)
//! is the production implementation; tests script their own.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::shared::error::Result;
use crate::shared::money::Money;

/// Payment state as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderPaymentStatus {
    Pending,
    Paid,
    Failed,
    Expired,
}

/// One-line-item hosted checkout
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub amount: Money,
    /// ISO currency code, lowercase
    pub currency: String,
    /// Line item name shown on the checkout page
    pub product_name: String,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub session_id: String,
    /// Hosted page the donor is redirected to
    pub url: String,
}

/// A verified webhook delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    SessionUpdate {
        session_id: String,
        status: ProviderPaymentStatus,
    },
    /// Authentic, but not an event we act on
    Ignored { event_type: String },
}

#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_session(&self, request: CheckoutSessionRequest) -> Result<CheckoutSession>;

    async fn session_status(&self, session_id: &str) -> Result<ProviderPaymentStatus>;

    /// Authenticate and decode a webhook. Signature problems are
    /// reported as [`PlatformError::InvalidSignature`](crate::PlatformError::InvalidSignature).
    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookOutcome>;
}
