//! Foundations API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::{Foundation, FoundationDonation};
use super::ledger::{DonationIntent, FoundationLedger, NewFoundation};
use crate::shared::error::Result;
use crate::shared::middleware::AdminAuth;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FoundationQuery {
    pub brand_id: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFoundationRequest {
    pub brand_id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub gallery_images: Vec<String>,
    pub goal_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DonateRequest {
    pub foundation_id: String,
    pub donor_name: String,
    pub donor_email: String,
    pub amount: Decimal,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FoundationResponse {
    pub id: String,
    pub brand_id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub gallery_images: Vec<String>,
    pub goal_amount: Option<Decimal>,
    pub raised_amount: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Foundation> for FoundationResponse {
    fn from(f: Foundation) -> Self {
        Self {
            id: f.id,
            brand_id: f.brand_id,
            title: f.title,
            description: f.description,
            image_url: f.image_url,
            gallery_images: f.gallery_images,
            goal_amount: f.goal_amount.map(|g| g.to_decimal()),
            raised_amount: f.raised_amount.to_decimal(),
            is_active: f.is_active,
            created_at: f.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FoundationDonationResponse {
    pub id: String,
    pub foundation_id: String,
    pub brand_id: String,
    pub donor_name: String,
    pub donor_email: String,
    pub amount: Decimal,
    pub message: Option<String>,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
}

impl From<FoundationDonation> for FoundationDonationResponse {
    fn from(d: FoundationDonation) -> Self {
        Self {
            id: d.id,
            foundation_id: d.foundation_id,
            brand_id: d.brand_id,
            donor_name: d.donor_name,
            donor_email: d.donor_email,
            amount: d.amount.to_decimal(),
            message: d.message,
            payment_status: d.payment_status,
            created_at: d.created_at,
        }
    }
}

#[derive(Clone)]
pub struct FoundationsState {
    pub ledger: FoundationLedger,
}

/// List foundations, newest first
#[utoipa::path(
    get,
    path = "/api/foundations",
    tag = "foundations",
    params(FoundationQuery),
    responses((status = 200, description = "Foundations", body = Vec<FoundationResponse>))
)]
pub async fn list_foundations(
    State(state): State<FoundationsState>,
    Query(query): Query<FoundationQuery>,
) -> Result<Json<Vec<FoundationResponse>>> {
    let brand = query.brand_id.as_deref().filter(|b| !b.is_empty());
    let foundations = state.ledger.list_foundations(brand, query.is_active).await?;
    Ok(Json(foundations.into_iter().map(Into::into).collect()))
}

/// Get a foundation
#[utoipa::path(
    get,
    path = "/api/foundations/{id}",
    tag = "foundations",
    params(("id" = String, Path, description = "Foundation ID")),
    responses(
        (status = 200, description = "Foundation", body = FoundationResponse),
        (status = 404, description = "Foundation not found")
    )
)]
pub async fn get_foundation(
    State(state): State<FoundationsState>,
    Path(id): Path<String>,
) -> Result<Json<FoundationResponse>> {
    Ok(Json(state.ledger.get_foundation(&id).await?.into()))
}

/// Create a foundation
#[utoipa::path(
    post,
    path = "/api/foundations",
    tag = "foundations",
    request_body = CreateFoundationRequest,
    responses(
        (status = 201, description = "Foundation created", body = FoundationResponse),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_foundation(
    State(state): State<FoundationsState>,
    _admin: AdminAuth,
    Json(req): Json<CreateFoundationRequest>,
) -> Result<(StatusCode, Json<FoundationResponse>)> {
    let foundation = state
        .ledger
        .create_foundation(NewFoundation {
            brand_id: req.brand_id,
            title: req.title,
            description: req.description,
            image_url: req.image_url,
            gallery_images: req.gallery_images,
            goal_amount: req.goal_amount,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(foundation.into())))
}

/// Donate to a foundation
#[utoipa::path(
    post,
    path = "/api/foundations/donate",
    tag = "foundations",
    request_body = DonateRequest,
    responses(
        (status = 201, description = "Donation recorded", body = FoundationDonationResponse),
        (status = 400, description = "Invalid amount or email"),
        (status = 404, description = "Foundation not found")
    )
)]
pub async fn donate(
    State(state): State<FoundationsState>,
    Json(req): Json<DonateRequest>,
) -> Result<(StatusCode, Json<FoundationDonationResponse>)> {
    let donation = state
        .ledger
        .donate(DonationIntent {
            foundation_id: req.foundation_id,
            donor_name: req.donor_name,
            donor_email: req.donor_email,
            amount: req.amount,
            message: req.message,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(donation.into())))
}

/// A foundation's donations, newest first
#[utoipa::path(
    get,
    path = "/api/foundations/{id}/donations",
    tag = "foundations",
    params(("id" = String, Path, description = "Foundation ID")),
    responses((status = 200, description = "Donations", body = Vec<FoundationDonationResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_donations(
    State(state): State<FoundationsState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Vec<FoundationDonationResponse>>> {
    let donations = state.ledger.list_donations(&id).await?;
    Ok(Json(donations.into_iter().map(Into::into).collect()))
}

pub fn foundations_router(state: FoundationsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_foundations, create_foundation))
        .routes(routes!(donate))
        .routes(routes!(get_foundation))
        .routes(routes!(list_donations))
        .with_state(state)
}
