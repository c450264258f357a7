//! Payment Session Manager
//!
//! Opens hosted checkouts and reconciles the local transaction with the
//! provider, either by polling (`get_status`) or on webhook delivery.
//! Both paths go through [`PaymentService::settle`], whose write only
//! matches a still-pending record, so a session settles exactly once.

use bson::doc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::entity::{PaymentStatus, PaymentTransaction, TransactionStatus};
use super::provider::{
    CheckoutProvider, CheckoutSession, CheckoutSessionRequest, ProviderPaymentStatus, WebhookOutcome,
};
use crate::member::Member;
use crate::shared::api_common::{FEED_LIMIT, LIST_LIMIT};
use crate::shared::error::{PlatformError, Result};
use crate::shared::money::Money;
use crate::shared::validation::require_text;
use crate::store::{Filter, FindOptions, Record, Repository};

/// Upper bound on paid transactions scanned for stats
const STATS_SCAN_LIMIT: i64 = 10_000;

/// Recent transactions included in stats
const RECENT_TRANSACTIONS: usize = 10;

/// Donor name recorded when none is given
const ANONYMOUS_DONOR: &str = "Anonymous";

/// What the donor asked to give
#[derive(Debug, Clone)]
pub struct CheckoutIntent {
    pub amount: Decimal,
    pub category: String,
    pub category_id: Option<String>,
    pub donor_name: Option<String>,
    pub brand_id: String,
}

/// Public origin of the request, used to build return URLs
#[derive(Debug, Clone)]
pub struct CheckoutOrigin {
    pub scheme: String,
    pub host: String,
}

impl CheckoutOrigin {
    fn base(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    pub fn success_url(&self) -> String {
        format!("{}/giving/success?session_id={{CHECKOUT_SESSION_ID}}", self.base())
    }

    pub fn cancel_url(&self) -> String {
        format!("{}/giving", self.base())
    }
}

/// Paid-transaction summary
#[derive(Debug, Clone)]
pub struct PaymentStats {
    pub total: Money,
    pub count: usize,
    pub by_category: BTreeMap<String, Money>,
    /// Newest first
    pub recent_transactions: Vec<PaymentTransaction>,
}

#[derive(Clone)]
pub struct PaymentService {
    transactions: Repository<PaymentTransaction>,
    provider: Arc<dyn CheckoutProvider>,
    currency: String,
}

impl PaymentService {
    pub fn new(
        transactions: Repository<PaymentTransaction>,
        provider: Arc<dyn CheckoutProvider>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            transactions,
            provider,
            currency: currency.into().to_lowercase(),
        }
    }

    /// Open a hosted checkout and record it as pending.
    pub async fn create_checkout(
        &self,
        intent: CheckoutIntent,
        caller: Option<&Member>,
        origin: &CheckoutOrigin,
    ) -> Result<CheckoutSession> {
        let amount = Money::from_decimal(intent.amount)?;
        require_text("category", &intent.category)?;
        require_text("brand_id", &intent.brand_id)?;

        let donor_name = intent
            .donor_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let mut metadata = BTreeMap::new();
        metadata.insert("category".to_string(), intent.category.clone());
        metadata.insert("brand_id".to_string(), intent.brand_id.clone());
        metadata.insert(
            "donor_name".to_string(),
            donor_name.clone().unwrap_or_else(|| ANONYMOUS_DONOR.to_string()),
        );
        if let Some(category_id) = &intent.category_id {
            metadata.insert("category_id".to_string(), category_id.clone());
        }
        if let Some(member) = caller {
            metadata.insert("user_id".to_string(), member.id.clone());
            metadata.insert("user_email".to_string(), member.email.clone());
        }

        let session = self
            .provider
            .create_session(CheckoutSessionRequest {
                amount,
                currency: self.currency.clone(),
                product_name: intent.category.clone(),
                success_url: origin.success_url(),
                cancel_url: origin.cancel_url(),
                metadata: metadata.clone(),
            })
            .await?;

        let now = bson::DateTime::now().to_chrono();
        let transaction = PaymentTransaction {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session.session_id.clone(),
            brand_id: intent.brand_id,
            amount,
            currency: self.currency.clone(),
            category: intent.category,
            category_id: intent.category_id,
            user_id: caller.map(|m| m.id.clone()),
            user_email: caller.map(|m| m.email.clone()),
            donor_name,
            payment_status: PaymentStatus::Pending,
            status: TransactionStatus::Initiated,
            metadata,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.transactions.insert(&transaction).await {
            error!(session_id = %session.session_id, error = %e, "Checkout opened but transaction not recorded");
            return Err(e);
        }

        info!(
            session_id = %transaction.session_id,
            amount = %transaction.amount,
            category = %transaction.category,
            "Checkout session created"
        );
        Ok(session)
    }

    async fn find_by_session(&self, session_id: &str) -> Result<Option<PaymentTransaction>> {
        self.transactions
            .find_one(Filter::new().eq("session_id", session_id))
            .await
    }

    /// Current state of a session, refreshed from the provider unless the
    /// local record is already terminal.
    pub async fn get_status(&self, session_id: &str) -> Result<PaymentTransaction> {
        let transaction = self
            .find_by_session(session_id)
            .await?
            .ok_or_else(|| PlatformError::not_found("PaymentTransaction", session_id))?;

        if transaction.payment_status.is_terminal() {
            return Ok(transaction);
        }

        let reported = self.provider.session_status(session_id).await?;
        self.settle(transaction, reported).await
    }

    /// Verify and apply a webhook delivery.
    pub async fn handle_webhook(&self, payload: &[u8], signature: &str) -> Result<()> {
        match self.provider.verify_webhook(payload, signature)? {
            WebhookOutcome::Ignored { event_type } => {
                debug!(event_type = %event_type, "Ignoring webhook event");
                Ok(())
            }
            WebhookOutcome::SessionUpdate { session_id, status } => {
                match self.find_by_session(&session_id).await? {
                    Some(transaction) => {
                        self.settle(transaction, status).await?;
                    }
                    None => warn!(session_id = %session_id, "Webhook for unknown checkout session"),
                }
                Ok(())
            }
        }
    }

    /// Persist a provider report. The write is conditional on the record
    /// still being pending; if another path settled it first, the stored
    /// record wins and is returned unchanged.
    async fn settle(
        &self,
        transaction: PaymentTransaction,
        reported: ProviderPaymentStatus,
    ) -> Result<PaymentTransaction> {
        let mut updated = transaction.clone();
        if !updated.apply(reported, bson::DateTime::now().to_chrono()) {
            return Ok(transaction);
        }

        let filter = Filter::new()
            .eq("session_id", updated.session_id.as_str())
            .eq("payment_status", PaymentStatus::Pending.as_str());
        let fields = doc! {
            "payment_status": updated.payment_status.as_str(),
            "status": updated.status.as_str(),
            "updated_at": bson::DateTime::from_chrono(updated.updated_at),
        };

        let matched = self
            .transactions
            .store()
            .set_fields(PaymentTransaction::collection_name(), filter.into_document(), fields)
            .await?;

        if !matched {
            debug!(session_id = %updated.session_id, "Transaction settled concurrently");
            return self
                .find_by_session(&updated.session_id)
                .await?
                .ok_or_else(|| PlatformError::not_found("PaymentTransaction", &updated.session_id));
        }

        if updated.payment_status.is_terminal() {
            info!(
                session_id = %updated.session_id,
                payment_status = updated.payment_status.as_str(),
                "Payment settled"
            );
        }
        Ok(updated)
    }

    /// A member's own transactions, newest first.
    pub async fn history(&self, user_id: &str, brand_id: Option<&str>) -> Result<Vec<PaymentTransaction>> {
        self.transactions
            .find(
                Filter::new().eq("user_id", user_id).brand(brand_id),
                FindOptions::newest_first(FEED_LIMIT),
            )
            .await
    }

    pub async fn list_all(&self, brand_id: Option<&str>) -> Result<Vec<PaymentTransaction>> {
        self.transactions
            .find(Filter::new().brand(brand_id), FindOptions::newest_first(LIST_LIMIT))
            .await
    }

    /// Totals over paid transactions only.
    pub async fn stats(&self, brand_id: Option<&str>) -> Result<PaymentStats> {
        let paid = self
            .transactions
            .find(
                Filter::new()
                    .brand(brand_id)
                    .eq("payment_status", PaymentStatus::Paid.as_str()),
                FindOptions::newest_first(STATS_SCAN_LIMIT),
            )
            .await?;

        let mut by_category: BTreeMap<String, Money> = BTreeMap::new();
        for tx in &paid {
            let entry = by_category.entry(tx.category.clone()).or_default();
            *entry = entry.saturating_add(tx.amount);
        }

        Ok(PaymentStats {
            total: paid.iter().map(|tx| tx.amount).sum(),
            count: paid.len(),
            by_category,
            recent_transactions: paid.into_iter().take(RECENT_TRANSACTIONS).collect(),
        })
    }
}
