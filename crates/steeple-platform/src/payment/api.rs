//! Payments API
//!
//! Online giving through hosted checkout, the provider webhook, and
//! transaction reporting.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::HOST, HeaderMap, Uri},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::{PaymentStatus, PaymentTransaction, TransactionStatus};
use super::service::{CheckoutIntent, CheckoutOrigin, PaymentService, PaymentStats};
use super::stripe::SIGNATURE_HEADER;
use crate::shared::api_common::BrandQuery;
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::{AdminAuth, MemberAuth, OptionalMember};

const FORWARDED_PROTO: &str = "x-forwarded-proto";

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCheckoutRequest {
    pub amount: Decimal,
    /// Giving category name, shown on the checkout page
    pub category: String,
    pub category_id: Option<String>,
    pub donor_name: Option<String>,
    pub brand_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    /// Hosted checkout page
    pub url: String,
    pub session_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentTransactionResponse {
    pub id: String,
    pub session_id: String,
    pub brand_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub category: String,
    pub category_id: Option<String>,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub donor_name: Option<String>,
    pub payment_status: PaymentStatus,
    pub status: TransactionStatus,
    pub metadata: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentTransaction> for PaymentTransactionResponse {
    fn from(t: PaymentTransaction) -> Self {
        Self {
            id: t.id,
            session_id: t.session_id,
            brand_id: t.brand_id,
            amount: t.amount.to_decimal(),
            currency: t.currency,
            category: t.category,
            category_id: t.category_id,
            user_id: t.user_id,
            user_email: t.user_email,
            donor_name: t.donor_name,
            payment_status: t.payment_status,
            status: t.status,
            metadata: t.metadata,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentStatsResponse {
    pub total: Decimal,
    pub count: usize,
    pub by_category: BTreeMap<String, Decimal>,
    pub recent_transactions: Vec<PaymentTransactionResponse>,
}

impl From<PaymentStats> for PaymentStatsResponse {
    fn from(s: PaymentStats) -> Self {
        Self {
            total: s.total.to_decimal(),
            count: s.count,
            by_category: s
                .by_category
                .into_iter()
                .map(|(category, amount)| (category, amount.to_decimal()))
                .collect(),
            recent_transactions: s.recent_transactions.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub status: String,
}

#[derive(Clone)]
pub struct PaymentsState {
    pub payments: PaymentService,
}

/// Public origin of the request. HTTP/2 requests carry the authority in
/// the URI instead of a `Host` header.
fn request_origin(headers: &HeaderMap, uri: &Uri) -> Result<CheckoutOrigin> {
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .ok_or_else(|| PlatformError::validation("Missing Host header"))?;
    let scheme = headers
        .get(FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");

    Ok(CheckoutOrigin {
        scheme: scheme.to_string(),
        host: host.to_string(),
    })
}

/// Start an online gift
#[utoipa::path(
    post,
    path = "/api/payments/create-checkout",
    tag = "payments",
    request_body = CreateCheckoutRequest,
    responses(
        (status = 200, description = "Checkout session opened", body = CheckoutResponse),
        (status = 400, description = "Invalid amount"),
        (status = 502, description = "Payment provider error")
    ),
    security((), ("bearer_auth" = []))
)]
pub async fn create_checkout(
    State(state): State<PaymentsState>,
    OptionalMember(member): OptionalMember,
    headers: HeaderMap,
    uri: Uri,
    Json(req): Json<CreateCheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let origin = request_origin(&headers, &uri)?;
    let session = state
        .payments
        .create_checkout(
            CheckoutIntent {
                amount: req.amount,
                category: req.category,
                category_id: req.category_id,
                donor_name: req.donor_name,
                brand_id: req.brand_id,
            },
            member.as_ref(),
            &origin,
        )
        .await?;

    Ok(Json(CheckoutResponse {
        url: session.url,
        session_id: session.session_id,
    }))
}

/// Payment status for a checkout session
#[utoipa::path(
    get,
    path = "/api/payments/status/{session_id}",
    tag = "payments",
    params(("session_id" = String, Path, description = "Checkout session ID")),
    responses(
        (status = 200, description = "Transaction", body = PaymentTransactionResponse),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_payment_status(
    State(state): State<PaymentsState>,
    Path(session_id): Path<String>,
) -> Result<Json<PaymentTransactionResponse>> {
    Ok(Json(state.payments.get_status(&session_id).await?.into()))
}

/// Stripe webhook receiver
#[utoipa::path(
    post,
    path = "/api/webhook/stripe",
    tag = "payments",
    request_body(content = String, description = "Raw Stripe event payload"),
    responses(
        (status = 200, description = "Event accepted", body = WebhookAck),
        (status = 400, description = "Invalid signature or payload")
    )
)]
pub async fn stripe_webhook(
    State(state): State<PaymentsState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| PlatformError::invalid_signature("missing Stripe-Signature header"))?;

    state.payments.handle_webhook(&body, signature).await?;
    Ok(Json(WebhookAck { status: "success".to_string() }))
}

/// The signed-in member's giving history
#[utoipa::path(
    get,
    path = "/api/payments/history",
    tag = "payments",
    params(BrandQuery),
    responses(
        (status = 200, description = "Transactions", body = Vec<PaymentTransactionResponse>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn payment_history(
    State(state): State<PaymentsState>,
    MemberAuth(member): MemberAuth,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<PaymentTransactionResponse>>> {
    let transactions = state.payments.history(&member.id, query.brand()).await?;
    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

/// All transactions
#[utoipa::path(
    get,
    path = "/api/payments/transactions",
    tag = "payments",
    params(BrandQuery),
    responses((status = 200, description = "Transactions", body = Vec<PaymentTransactionResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_transactions(
    State(state): State<PaymentsState>,
    _admin: AdminAuth,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<PaymentTransactionResponse>>> {
    let transactions = state.payments.list_all(query.brand()).await?;
    Ok(Json(transactions.into_iter().map(Into::into).collect()))
}

/// Online giving totals (paid only)
#[utoipa::path(
    get,
    path = "/api/payments/stats",
    tag = "payments",
    params(BrandQuery),
    responses((status = 200, description = "Totals", body = PaymentStatsResponse)),
    security(("bearer_auth" = []))
)]
pub async fn payment_stats(
    State(state): State<PaymentsState>,
    _admin: AdminAuth,
    Query(query): Query<BrandQuery>,
) -> Result<Json<PaymentStatsResponse>> {
    Ok(Json(state.payments.stats(query.brand()).await?.into()))
}

pub fn payments_router(state: PaymentsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_checkout))
        .routes(routes!(get_payment_status))
        .routes(routes!(stripe_webhook))
        .routes(routes!(payment_history))
        .routes(routes!(list_transactions))
        .routes(routes!(payment_stats))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_origin_defaults_to_http() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("grace.church"));
        let origin = request_origin(&headers, &Uri::from_static("/api/payments/create-checkout")).unwrap();
        assert_eq!(origin.scheme, "http");
        assert_eq!(origin.host, "grace.church");
    }

    #[test]
    fn test_origin_honours_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("grace.church"));
        headers.insert(FORWARDED_PROTO, HeaderValue::from_static("https, http"));
        assert_eq!(request_origin(&headers, &Uri::from_static("/api/payments/create-checkout")).unwrap().scheme, "https");
    }

    #[test]
    fn test_origin_requires_host() {
        let path_only = Uri::from_static("/api/payments/create-checkout");
        assert!(request_origin(&HeaderMap::new(), &path_only).is_err());
    }

    #[test]
    fn test_origin_falls_back_to_uri_authority() {
        let uri = Uri::from_static("https://grace.church/api/payments/create-checkout");
        let origin = request_origin(&HeaderMap::new(), &uri).unwrap();
        assert_eq!(origin.host, "grace.church");
        assert_eq!(origin.scheme, "https");
    }
}
