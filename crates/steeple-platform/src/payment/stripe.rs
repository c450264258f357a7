//! Stripe Checkout client
//!
//! Creates hosted checkout sessions, polls their state, and
//! authenticates webhook deliveries (`Stripe-Signature`).

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use super::provider::{
    CheckoutProvider, CheckoutSession, CheckoutSessionRequest, ProviderPaymentStatus, WebhookOutcome,
};
use crate::shared::error::{PlatformError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub api_key: String,
    pub webhook_secret: String,
    /// Overridable for tests and proxies
    pub api_base: String,
    pub request_timeout: Duration,
    /// Maximum age of a signed webhook
    pub webhook_tolerance: Duration,
}

impl StripeConfig {
    pub fn from_settings(settings: &steeple_config::PaymentsConfig) -> Self {
        Self {
            api_key: settings.stripe_api_key.clone(),
            webhook_secret: settings.stripe_webhook_secret.clone(),
            api_base: settings.stripe_api_base.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
            webhook_tolerance: Duration::from_secs(settings.webhook_tolerance_secs),
        }
    }
}

/// Subset of the Checkout Session object we read
#[derive(Debug, Deserialize)]
struct SessionObject {
    id: String,
    url: Option<String>,
    status: Option<String>,
    payment_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
struct WebhookEventData {
    object: SessionObject,
}

pub struct StripeCheckout {
    config: StripeConfig,
    client: reqwest::Client,
}

impl StripeCheckout {
    pub fn new(config: StripeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PlatformError::configuration(format!("HTTP client: {}", e)))?;

        if config.api_key.is_empty() {
            warn!("Stripe API key is not configured; checkout calls will fail");
        }
        if config.webhook_secret.is_empty() {
            warn!("Stripe webhook secret is not configured; webhooks will be rejected");
        }

        Ok(Self { config, client })
    }

    fn sessions_url(&self) -> String {
        format!("{}/v1/checkout/sessions", self.config.api_base)
    }

    fn require_api_key(&self) -> Result<&str> {
        if self.config.api_key.is_empty() {
            return Err(PlatformError::configuration("payments.stripe_api_key is not set"));
        }
        Ok(&self.config.api_key)
    }

    async fn read_session(response: reqwest::Response) -> Result<SessionObject> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<SessionObject>().await?);
        }

        let message = response
            .json::<StripeErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error.message)
            .unwrap_or_else(|| status.to_string());
        Err(PlatformError::provider(format!("Stripe returned {}: {}", status, message)))
    }

    /// Check a `Stripe-Signature` header against `payload` as of `now`
    /// (unix seconds).
    pub fn verify_signature_at(&self, payload: &[u8], header: &str, now: i64) -> Result<()> {
        if self.config.webhook_secret.is_empty() {
            return Err(PlatformError::invalid_signature("webhook secret is not configured"));
        }

        let mut timestamp = None;
        let mut candidates = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = Some(value),
                Some(("v1", value)) => candidates.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or_else(|| PlatformError::invalid_signature("missing timestamp"))?;
        if candidates.is_empty() {
            return Err(PlatformError::invalid_signature("missing v1 signature"));
        }

        let issued: i64 = timestamp
            .parse()
            .map_err(|_| PlatformError::invalid_signature(format!("bad timestamp '{}'", timestamp)))?;
        let tolerance = i64::try_from(self.config.webhook_tolerance.as_secs()).unwrap_or(i64::MAX);
        if now.saturating_sub(issued) > tolerance {
            return Err(PlatformError::invalid_signature("timestamp outside tolerance"));
        }

        let expected = compute_signature(&self.config.webhook_secret, timestamp, payload);
        let matched = candidates
            .iter()
            .any(|candidate| bool::from(candidate.as_bytes().ct_eq(expected.as_bytes())));
        if !matched {
            return Err(PlatformError::invalid_signature("signature mismatch"));
        }
        Ok(())
    }

    fn decode_event(payload: &[u8]) -> Result<WebhookOutcome> {
        let event: WebhookEvent = serde_json::from_slice(payload)
            .map_err(|e| PlatformError::validation(format!("Malformed webhook payload: {}", e)))?;
        let session = event.data.object;

        let status = match event.event_type.as_str() {
            "checkout.session.completed" => {
                if session.payment_status.as_deref() == Some("paid") {
                    ProviderPaymentStatus::Paid
                } else {
                    ProviderPaymentStatus::Pending
                }
            }
            "checkout.session.async_payment_succeeded" => ProviderPaymentStatus::Paid,
            "checkout.session.async_payment_failed" => ProviderPaymentStatus::Failed,
            "checkout.session.expired" => ProviderPaymentStatus::Expired,
            _ => return Ok(WebhookOutcome::Ignored { event_type: event.event_type }),
        };

        Ok(WebhookOutcome::SessionUpdate { session_id: session.id, status })
    }
}

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`
pub fn compute_signature(secret: &str, timestamp: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn session_status(session: &SessionObject) -> ProviderPaymentStatus {
    if session.payment_status.as_deref() == Some("paid") {
        ProviderPaymentStatus::Paid
    } else if session.status.as_deref() == Some("expired") {
        ProviderPaymentStatus::Expired
    } else {
        ProviderPaymentStatus::Pending
    }
}

#[async_trait]
impl CheckoutProvider for StripeCheckout {
    async fn create_session(&self, request: CheckoutSessionRequest) -> Result<CheckoutSession> {
        let api_key = self.require_api_key()?;

        let mut form: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("success_url".into(), request.success_url),
            ("cancel_url".into(), request.cancel_url),
            ("line_items[0][quantity]".into(), "1".into()),
            ("line_items[0][price_data][currency]".into(), request.currency),
            ("line_items[0][price_data][unit_amount]".into(), request.amount.cents().to_string()),
            ("line_items[0][price_data][product_data][name]".into(), request.product_name),
        ];
        form.extend(
            request
                .metadata
                .into_iter()
                .map(|(key, value)| (format!("metadata[{}]", key), value)),
        );

        let response = self
            .client
            .post(self.sessions_url())
            .bearer_auth(api_key)
            .form(&form)
            .send()
            .await?;
        let session = Self::read_session(response).await?;

        let url = session
            .url
            .ok_or_else(|| PlatformError::provider("Checkout session has no URL"))?;
        debug!(session_id = %session.id, "Checkout session created");
        Ok(CheckoutSession { session_id: session.id, url })
    }

    async fn session_status(&self, session_id: &str) -> Result<ProviderPaymentStatus> {
        let api_key = self.require_api_key()?;

        let response = self
            .client
            .get(format!("{}/{}", self.sessions_url(), session_id))
            .bearer_auth(api_key)
            .send()
            .await?;
        let session = Self::read_session(response).await?;
        Ok(session_status(&session))
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookOutcome> {
        self.verify_signature_at(payload, signature, chrono::Utc::now().timestamp())?;
        Self::decode_event(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::money::Money;
    use std::collections::BTreeMap;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SECRET: &str = "whsec_test";

    fn config(api_base: &str) -> StripeConfig {
        StripeConfig {
            api_key: "sk_test_123".into(),
            webhook_secret: SECRET.into(),
            api_base: api_base.into(),
            request_timeout: Duration::from_secs(5),
            webhook_tolerance: Duration::from_secs(300),
        }
    }

    fn checkout(api_base: &str) -> StripeCheckout {
        StripeCheckout::new(config(api_base)).unwrap()
    }

    fn signed_header(payload: &[u8], timestamp: i64) -> String {
        let ts = timestamp.to_string();
        format!("t={},v1={}", ts, compute_signature(SECRET, &ts, payload))
    }

    fn event(event_type: &str, payment_status: &str) -> Vec<u8> {
        serde_json::json!({
            "id": "evt_1",
            "type": event_type,
            "data": { "object": { "id": "cs_test_1", "payment_status": payment_status, "status": "complete" } }
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn test_valid_signature_accepted() {
        let stripe = checkout("http://unused");
        let payload = event("checkout.session.completed", "paid");
        let now = 1_760_000_000;
        assert!(stripe.verify_signature_at(&payload, &signed_header(&payload, now), now).is_ok());
    }

    #[test]
    fn test_any_matching_v1_accepted() {
        let stripe = checkout("http://unused");
        let payload = b"{}";
        let now = 1_760_000_000;
        let valid = signed_header(payload, now);
        let header = format!("{},v1=deadbeef", valid);
        assert!(stripe.verify_signature_at(payload, &header, now).is_ok());
    }

    #[test]
    fn test_tampered_body_rejected() {
        let stripe = checkout("http://unused");
        let payload = event("checkout.session.completed", "paid");
        let now = 1_760_000_000;
        let header = signed_header(&payload, now);

        let tampered = event("checkout.session.completed", "unpaid");
        let err = stripe.verify_signature_at(&tampered, &header, now).unwrap_err();
        assert!(matches!(err, PlatformError::InvalidSignature { .. }));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let stripe = checkout("http://unused");
        let payload = b"{}";
        let signed_at = 1_760_000_000;
        let header = signed_header(payload, signed_at);
        assert!(stripe.verify_signature_at(payload, &header, signed_at + 301).is_err());
        assert!(stripe.verify_signature_at(payload, &header, signed_at + 300).is_ok());
    }

    #[test]
    fn test_malformed_headers_rejected() {
        let stripe = checkout("http://unused");
        for header in ["", "garbage", "t=123", "v1=abc", "t=abc,v1=abc"] {
            let err = stripe.verify_signature_at(b"{}", header, 123).unwrap_err();
            assert!(matches!(err, PlatformError::InvalidSignature { .. }), "{:?}", header);
        }
    }

    #[test]
    fn test_event_mapping() {
        let cases = [
            ("checkout.session.completed", "paid", ProviderPaymentStatus::Paid),
            ("checkout.session.completed", "unpaid", ProviderPaymentStatus::Pending),
            ("checkout.session.async_payment_succeeded", "paid", ProviderPaymentStatus::Paid),
            ("checkout.session.async_payment_failed", "unpaid", ProviderPaymentStatus::Failed),
            ("checkout.session.expired", "unpaid", ProviderPaymentStatus::Expired),
        ];
        for (event_type, payment_status, expected) in cases {
            let outcome = StripeCheckout::decode_event(&event(event_type, payment_status)).unwrap();
            assert_eq!(
                outcome,
                WebhookOutcome::SessionUpdate { session_id: "cs_test_1".into(), status: expected },
                "{}",
                event_type
            );
        }

        let ignored = StripeCheckout::decode_event(&event("payment_intent.created", "paid")).unwrap();
        assert_eq!(ignored, WebhookOutcome::Ignored { event_type: "payment_intent.created".into() });
    }

    #[tokio::test]
    async fn test_create_session_posts_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("authorization", "Bearer sk_test_123"))
            .and(body_string_contains("mode=payment"))
            .and(body_string_contains("unit_amount%5D=5000"))
            .and(body_string_contains("metadata%5Bbrand_id%5D=b1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_1",
                "url": "https://checkout.stripe.com/c/pay/cs_test_1",
                "status": "open",
                "payment_status": "unpaid"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let stripe = checkout(&server.uri());
        let mut metadata = BTreeMap::new();
        metadata.insert("brand_id".to_string(), "b1".to_string());

        let session = stripe
            .create_session(CheckoutSessionRequest {
                amount: Money::from_cents(5_000),
                currency: "usd".into(),
                product_name: "General".into(),
                success_url: "http://church.test/giving/success?session_id={CHECKOUT_SESSION_ID}".into(),
                cancel_url: "http://church.test/giving".into(),
                metadata,
            })
            .await
            .unwrap();

        assert_eq!(session.session_id, "cs_test_1");
        assert_eq!(session.url, "https://checkout.stripe.com/c/pay/cs_test_1");
    }

    #[tokio::test]
    async fn test_session_status_mapping() {
        let server = MockServer::start().await;
        for (id, status, payment_status) in [
            ("cs_paid", "complete", "paid"),
            ("cs_expired", "expired", "unpaid"),
            ("cs_open", "open", "unpaid"),
        ] {
            Mock::given(method("GET"))
                .and(path(format!("/v1/checkout/sessions/{}", id)))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "id": id, "url": null, "status": status, "payment_status": payment_status
                })))
                .mount(&server)
                .await;
        }

        let stripe = checkout(&server.uri());
        assert_eq!(stripe.session_status("cs_paid").await.unwrap(), ProviderPaymentStatus::Paid);
        assert_eq!(stripe.session_status("cs_expired").await.unwrap(), ProviderPaymentStatus::Expired);
        assert_eq!(stripe.session_status("cs_open").await.unwrap(), ProviderPaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_provider_error_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": { "message": "No such checkout.session: 'cs_missing'" }
            })))
            .mount(&server)
            .await;

        let err = checkout(&server.uri()).session_status("cs_missing").await.unwrap_err();
        match err {
            PlatformError::PaymentProvider { message } => assert!(message.contains("No such checkout.session")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_is_configuration_error() {
        let mut cfg = config("http://unused");
        cfg.api_key.clear();
        let err = StripeCheckout::new(cfg).unwrap().session_status("cs_1").await.unwrap_err();
        assert!(matches!(err, PlatformError::Configuration { .. }));
    }
}
