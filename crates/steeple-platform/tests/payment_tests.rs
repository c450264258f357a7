//! Payment Session Integration Tests
//!
//! Drives [`PaymentService`] against a scripted checkout provider and the
//! in-memory store.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::Notify;

use steeple_platform::member::Member;
use steeple_platform::payment::{
    CheckoutIntent, CheckoutOrigin, CheckoutProvider, CheckoutSession, CheckoutSessionRequest,
    PaymentService, PaymentStatus, ProviderPaymentStatus, TransactionStatus, WebhookOutcome,
};
use steeple_platform::{DocumentStore, MemoryStore, Money, PlatformError, Repository, Result};

const GOOD_SIGNATURE: &str = "t=1,v1=good";

/// Provider whose session status is set by the test.
///
/// Webhook payloads are `<session_id>=<status>`; any signature other
/// than [`GOOD_SIGNATURE`] is rejected.
struct ScriptedProvider {
    status: Mutex<ProviderPaymentStatus>,
    sessions_opened: AtomicUsize,
    status_calls: AtomicUsize,
    last_request: Mutex<Option<CheckoutSessionRequest>>,
    /// When set, `session_status` signals `polled` and waits for `release`
    hold_status: AtomicBool,
    polled: Notify,
    release: Notify,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self {
            status: Mutex::new(ProviderPaymentStatus::Pending),
            sessions_opened: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            hold_status: AtomicBool::new(false),
            polled: Notify::new(),
            release: Notify::new(),
        }
    }

    fn report(&self, status: ProviderPaymentStatus) {
        *self.status.lock() = status;
    }

    fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

fn parse_status(raw: &str) -> ProviderPaymentStatus {
    match raw {
        "paid" => ProviderPaymentStatus::Paid,
        "failed" => ProviderPaymentStatus::Failed,
        "expired" => ProviderPaymentStatus::Expired,
        _ => ProviderPaymentStatus::Pending,
    }
}

#[async_trait]
impl CheckoutProvider for ScriptedProvider {
    async fn create_session(&self, request: CheckoutSessionRequest) -> Result<CheckoutSession> {
        let n = self.sessions_opened.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_request.lock() = Some(request);
        Ok(CheckoutSession {
            session_id: format!("cs_test_{}", n),
            url: format!("https://checkout.test/pay/cs_test_{}", n),
        })
    }

    async fn session_status(&self, _session_id: &str) -> Result<ProviderPaymentStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let status = *self.status.lock();
        if self.hold_status.load(Ordering::SeqCst) {
            self.polled.notify_one();
            self.release.notified().await;
        }
        Ok(status)
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<WebhookOutcome> {
        if signature != GOOD_SIGNATURE {
            return Err(PlatformError::invalid_signature("signature mismatch"));
        }
        let body = std::str::from_utf8(payload).map_err(|_| PlatformError::invalid_signature("not utf-8"))?;
        Ok(match body.split_once('=') {
            Some((session_id, status)) => WebhookOutcome::SessionUpdate {
                session_id: session_id.to_string(),
                status: parse_status(status),
            },
            None => WebhookOutcome::Ignored { event_type: body.to_string() },
        })
    }
}

fn service() -> (PaymentService, Arc<ScriptedProvider>) {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let provider = Arc::new(ScriptedProvider::new());
    let service = PaymentService::new(Repository::new(store), provider.clone(), "usd");
    (service, provider)
}

fn origin() -> CheckoutOrigin {
    CheckoutOrigin {
        scheme: "https".into(),
        host: "grace.example.org".into(),
    }
}

fn intent(amount: &str) -> CheckoutIntent {
    CheckoutIntent {
        amount: Decimal::from_str(amount).unwrap(),
        category: "Tithe".into(),
        category_id: Some("cat-1".into()),
        donor_name: None,
        brand_id: "grace".into(),
    }
}

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_checkout_then_webhook_settles_once() {
        let (payments, provider) = service();

        let session = payments.create_checkout(intent("50.00"), None, &origin()).await.unwrap();
        assert_eq!(session.session_id, "cs_test_1");

        let pending = payments.get_status(&session.session_id).await.unwrap();
        assert_eq!(pending.payment_status, PaymentStatus::Pending);
        assert_eq!(pending.status, TransactionStatus::Initiated);
        assert_eq!(pending.amount, Money::from_cents(5_000));
        assert_eq!(provider.status_calls(), 1);

        let delivery = format!("{}=paid", session.session_id);
        payments.handle_webhook(delivery.as_bytes(), GOOD_SIGNATURE).await.unwrap();

        let paid = payments.get_status(&session.session_id).await.unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert_eq!(paid.status, TransactionStatus::Completed);
        // Terminal records are not re-polled
        assert_eq!(provider.status_calls(), 1);

        let settled_at = paid.updated_at;
        payments.handle_webhook(delivery.as_bytes(), GOOD_SIGNATURE).await.unwrap();
        let again = payments.get_status(&session.session_id).await.unwrap();
        assert_eq!(again.payment_status, PaymentStatus::Paid);
        assert_eq!(again.updated_at, settled_at);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_polling_and_webhook_race_settles_once() {
        let (payments, provider) = service();
        let session = payments.create_checkout(intent("50.00"), None, &origin()).await.unwrap();

        provider.report(ProviderPaymentStatus::Paid);
        provider.hold_status.store(true, Ordering::SeqCst);

        // Poll reads the pending record, then stalls inside the provider
        let poll = {
            let payments = payments.clone();
            let session_id = session.session_id.clone();
            tokio::spawn(async move { payments.get_status(&session_id).await })
        };
        provider.polled.notified().await;

        let delivery = format!("{}=paid", session.session_id);
        payments.handle_webhook(delivery.as_bytes(), GOOD_SIGNATURE).await.unwrap();
        let settled = payments.get_status(&session.session_id).await.unwrap();
        assert_eq!(settled.payment_status, PaymentStatus::Paid);

        provider.release.notify_one();
        let polled = poll.await.unwrap().unwrap();

        // The poll lost the compare-and-set and reports the stored record
        assert_eq!(polled.payment_status, PaymentStatus::Paid);
        assert_eq!(polled.status, TransactionStatus::Completed);
        assert_eq!(polled.updated_at, settled.updated_at);

        let all = payments.list_all(None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].updated_at, settled.updated_at);
        assert_eq!(provider.status_calls(), 1);
    }

    #[tokio::test]
    async fn test_terminal_record_ignores_later_reports() {
        let (payments, provider) = service();
        let session = payments.create_checkout(intent("10"), None, &origin()).await.unwrap();

        provider.report(ProviderPaymentStatus::Expired);
        let expired = payments.get_status(&session.session_id).await.unwrap();
        assert_eq!(expired.payment_status, PaymentStatus::Expired);
        assert_eq!(expired.status, TransactionStatus::Failed);

        let late = format!("{}=paid", session.session_id);
        payments.handle_webhook(late.as_bytes(), GOOD_SIGNATURE).await.unwrap();

        let still = payments.get_status(&session.session_id).await.unwrap();
        assert_eq!(still.payment_status, PaymentStatus::Expired);
        assert_eq!(provider.status_calls(), 1);
    }

    #[tokio::test]
    async fn test_polling_settles_paid() {
        let (payments, provider) = service();
        let session = payments.create_checkout(intent("25.50"), None, &origin()).await.unwrap();

        provider.report(ProviderPaymentStatus::Paid);
        let paid = payments.get_status(&session.session_id).await.unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);

        let stats = payments.stats(Some("grace")).await.unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.total, Money::from_cents(2_550));
        assert_eq!(stats.by_category.get("Tithe"), Some(&Money::from_cents(2_550)));
    }

    #[tokio::test]
    async fn test_member_checkout_is_attributed() {
        let (payments, provider) = service();
        let member = Member::new("ruth@example.org", "Ruth", "grace", "hash");

        let session = payments
            .create_checkout(intent("5"), Some(&member), &origin())
            .await
            .unwrap();

        let request = provider.last_request.lock().clone().unwrap();
        assert_eq!(request.metadata.get("user_id"), Some(&member.id));
        assert_eq!(request.metadata.get("donor_name").map(String::as_str), Some("Anonymous"));
        assert_eq!(
            request.success_url,
            "https://grace.example.org/giving/success?session_id={CHECKOUT_SESSION_ID}"
        );

        let history = payments.history(&member.id, None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].session_id, session.session_id);
        assert_eq!(history[0].user_email.as_deref(), Some("ruth@example.org"));
    }
}

mod rejection_tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_signature_mutates_nothing() {
        let (payments, _provider) = service();
        let session = payments.create_checkout(intent("50"), None, &origin()).await.unwrap();

        let forged = format!("{}=paid", session.session_id);
        let err = payments
            .handle_webhook(forged.as_bytes(), "t=1,v1=forged")
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::InvalidSignature { .. }));

        let all = payments.list_all(None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_unknown_session_webhook_is_acknowledged() {
        let (payments, _provider) = service();
        payments
            .handle_webhook(b"cs_nobody=paid", GOOD_SIGNATURE)
            .await
            .unwrap();
        payments
            .handle_webhook(b"customer.created", GOOD_SIGNATURE)
            .await
            .unwrap();
        assert!(payments.list_all(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session_status_is_not_found() {
        let (payments, provider) = service();
        let err = payments.get_status("cs_missing").await.unwrap_err();
        assert!(matches!(err, PlatformError::NotFound { .. }));
        assert_eq!(provider.status_calls(), 0);
    }

    #[tokio::test]
    async fn test_non_positive_amount_opens_no_session() {
        let (payments, provider) = service();
        let err = payments.create_checkout(intent("0"), None, &origin()).await.unwrap_err();
        assert!(matches!(err, PlatformError::Validation { .. }));
        assert_eq!(provider.sessions_opened.load(Ordering::SeqCst), 0);
    }
}
