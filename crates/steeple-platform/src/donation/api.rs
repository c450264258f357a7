//! Manual Donations API

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::Donation;
use crate::shared::api_common::{BrandQuery, LIST_LIMIT};
use crate::shared::error::Result;
use crate::shared::middleware::AdminAuth;
use crate::shared::money::Money;
use crate::shared::validation::{normalize_optional_email, require_text};
use crate::store::{Filter, FindOptions, Repository};

/// Upper bound on records scanned for the stats summary
const STATS_SCAN_LIMIT: i64 = 10_000;

/// Number of recent records included in the stats summary
const RECENT_DONATIONS: usize = 10;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DonationRequest {
    pub brand_id: String,
    pub donor_name: String,
    pub donor_email: Option<String>,
    pub amount: Decimal,
    pub category: String,
    pub date: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DonationResponse {
    pub id: String,
    pub brand_id: String,
    pub donor_name: String,
    pub donor_email: Option<String>,
    pub amount: Decimal,
    pub category: String,
    pub date: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Donation> for DonationResponse {
    fn from(d: Donation) -> Self {
        Self {
            id: d.id,
            brand_id: d.brand_id,
            donor_name: d.donor_name,
            donor_email: d.donor_email,
            amount: d.amount.to_decimal(),
            category: d.category,
            date: d.date,
            notes: d.notes,
            created_at: d.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DonationStatsResponse {
    pub total: Decimal,
    pub count: usize,
    pub by_category: BTreeMap<String, Decimal>,
    /// Most recent records, newest first
    pub donations: Vec<DonationResponse>,
}

impl DonationStatsResponse {
    /// Summarise records ordered newest first.
    fn summarise(donations: Vec<Donation>) -> Self {
        let total: Money = donations.iter().map(|d| d.amount).sum();

        let mut by_category: BTreeMap<String, Money> = BTreeMap::new();
        for donation in &donations {
            let entry = by_category.entry(donation.category.clone()).or_default();
            *entry = entry.saturating_add(donation.amount);
        }

        Self {
            total: total.to_decimal(),
            count: donations.len(),
            by_category: by_category
                .into_iter()
                .map(|(category, amount)| (category, amount.to_decimal()))
                .collect(),
            donations: donations
                .into_iter()
                .take(RECENT_DONATIONS)
                .map(Into::into)
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct DonationsState {
    pub donations: Repository<Donation>,
}

/// Record an offline donation
#[utoipa::path(
    post,
    path = "/api/donations",
    tag = "donations",
    request_body = DonationRequest,
    responses(
        (status = 201, description = "Donation recorded", body = DonationResponse),
        (status = 400, description = "Invalid amount or email")
    ),
    security(("bearer_auth" = []))
)]
pub async fn record_donation(
    State(state): State<DonationsState>,
    _admin: AdminAuth,
    Json(req): Json<DonationRequest>,
) -> Result<(StatusCode, Json<DonationResponse>)> {
    require_text("brand_id", &req.brand_id)?;
    require_text("donor_name", &req.donor_name)?;
    require_text("category", &req.category)?;

    let donation = Donation {
        id: uuid::Uuid::new_v4().to_string(),
        brand_id: req.brand_id,
        donor_name: req.donor_name,
        donor_email: normalize_optional_email(req.donor_email.as_deref())?,
        amount: Money::from_decimal(req.amount)?,
        category: req.category,
        date: req.date,
        notes: req.notes,
        created_at: Utc::now(),
    };
    state.donations.insert(&donation).await?;

    info!(donation_id = %donation.id, amount = %donation.amount, "Offline donation recorded");
    Ok((StatusCode::CREATED, Json(donation.into())))
}

/// List offline donations
#[utoipa::path(
    get,
    path = "/api/donations",
    tag = "donations",
    params(BrandQuery),
    responses((status = 200, description = "Donations", body = Vec<DonationResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_donations(
    State(state): State<DonationsState>,
    _admin: AdminAuth,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<DonationResponse>>> {
    let donations = state
        .donations
        .find(Filter::new().brand(query.brand()), FindOptions::newest_first(LIST_LIMIT))
        .await?;
    Ok(Json(donations.into_iter().map(Into::into).collect()))
}

/// Totals for offline donations
#[utoipa::path(
    get,
    path = "/api/donations/stats",
    tag = "donations",
    params(BrandQuery),
    responses((status = 200, description = "Donation totals", body = DonationStatsResponse)),
    security(("bearer_auth" = []))
)]
pub async fn donation_stats(
    State(state): State<DonationsState>,
    _admin: AdminAuth,
    Query(query): Query<BrandQuery>,
) -> Result<Json<DonationStatsResponse>> {
    let donations = state
        .donations
        .find(Filter::new().brand(query.brand()), FindOptions::newest_first(STATS_SCAN_LIMIT))
        .await?;
    Ok(Json(DonationStatsResponse::summarise(donations)))
}

pub fn donations_router(state: DonationsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(record_donation, list_donations))
        .routes(routes!(donation_stats))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn donation(category: &str, cents: i64) -> Donation {
        Donation {
            id: uuid::Uuid::new_v4().to_string(),
            brand_id: "b1".into(),
            donor_name: "Ruth".into(),
            donor_email: None,
            amount: Money::from_cents(cents),
            category: category.into(),
            date: "2026-03-01".into(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_summarise_groups_by_category() {
        let stats = DonationStatsResponse::summarise(vec![
            donation("General", 10_000),
            donation("Missions", 2_550),
            donation("General", 5_000),
        ]);

        assert_eq!(stats.count, 3);
        assert_eq!(stats.total, Decimal::from_str("175.50").unwrap());
        assert_eq!(stats.by_category["General"], Decimal::from_str("150.00").unwrap());
        assert_eq!(stats.by_category["Missions"], Decimal::from_str("25.50").unwrap());
    }

    #[test]
    fn test_summarise_keeps_ten_most_recent() {
        let donations: Vec<Donation> = (0..15).map(|i| donation("General", 100 + i)).collect();
        let newest_id = donations[0].id.clone();

        let stats = DonationStatsResponse::summarise(donations);
        assert_eq!(stats.count, 15);
        assert_eq!(stats.donations.len(), 10);
        assert_eq!(stats.donations[0].id, newest_id);
    }

    #[test]
    fn test_summarise_empty() {
        let stats = DonationStatsResponse::summarise(Vec::new());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.total, Decimal::ZERO);
        assert!(stats.by_category.is_empty());
    }
}
