//! Prayer Requests API
//!
//! Public submission, the admin inbox, and the public prayer wall.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use bson::doc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::{PrayerRequest, PrayerStatus};
use crate::shared::api_common::{BrandQuery, MessageResponse, StatusQuery, FEED_LIMIT, LIST_LIMIT};
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::AdminAuth;
use crate::shared::validation::{normalize_optional_email, require_text};
use crate::store::{Filter, FindOptions, Repository};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PrayerRequestRequest {
    pub brand_id: String,
    pub name: String,
    pub email: Option<String>,
    pub request: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PrayerRequestResponse {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub email: Option<String>,
    pub request: String,
    pub is_anonymous: bool,
    pub status: PrayerStatus,
    pub created_at: DateTime<Utc>,
}

impl From<PrayerRequest> for PrayerRequestResponse {
    fn from(p: PrayerRequest) -> Self {
        Self {
            id: p.id,
            brand_id: p.brand_id,
            name: p.name,
            email: p.email,
            request: p.request,
            is_anonymous: p.is_anonymous,
            status: p.status,
            created_at: p.created_at,
        }
    }
}

/// Prayer wall entry; contact details are withheld
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicPrayerRequestResponse {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub request: String,
    pub status: PrayerStatus,
    pub created_at: DateTime<Utc>,
}

impl From<PrayerRequest> for PublicPrayerRequestResponse {
    fn from(p: PrayerRequest) -> Self {
        Self {
            id: p.id,
            brand_id: p.brand_id,
            name: p.name,
            request: p.request,
            status: p.status,
            created_at: p.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PrayerRequestsState {
    pub prayers: Repository<PrayerRequest>,
}

/// Submit a prayer request
#[utoipa::path(
    post,
    path = "/api/prayer-requests",
    tag = "prayer-requests",
    request_body = PrayerRequestRequest,
    responses(
        (status = 201, description = "Prayer request received", body = PrayerRequestResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn submit_prayer_request(
    State(state): State<PrayerRequestsState>,
    Json(req): Json<PrayerRequestRequest>,
) -> Result<(StatusCode, Json<PrayerRequestResponse>)> {
    require_text("brand_id", &req.brand_id)?;
    require_text("name", &req.name)?;
    require_text("request", &req.request)?;

    let prayer = PrayerRequest {
        id: uuid::Uuid::new_v4().to_string(),
        brand_id: req.brand_id,
        name: req.name,
        email: normalize_optional_email(req.email.as_deref())?,
        request: req.request,
        is_anonymous: req.is_anonymous,
        status: PrayerStatus::New,
        created_at: Utc::now(),
    };
    state.prayers.insert(&prayer).await?;
    Ok((StatusCode::CREATED, Json(prayer.into())))
}

/// List all prayer requests
#[utoipa::path(
    get,
    path = "/api/prayer-requests",
    tag = "prayer-requests",
    params(BrandQuery),
    responses((status = 200, description = "Prayer requests", body = Vec<PrayerRequestResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_prayer_requests(
    State(state): State<PrayerRequestsState>,
    _admin: AdminAuth,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<PrayerRequestResponse>>> {
    let prayers = state
        .prayers
        .find(Filter::new().brand(query.brand()), FindOptions::newest_first(LIST_LIMIT))
        .await?;
    Ok(Json(prayers.into_iter().map(Into::into).collect()))
}

/// Public prayer wall
#[utoipa::path(
    get,
    path = "/api/prayer-requests/public",
    tag = "prayer-requests",
    params(BrandQuery),
    responses((status = 200, description = "Non-anonymous prayer requests", body = Vec<PublicPrayerRequestResponse>))
)]
pub async fn list_public_prayer_requests(
    State(state): State<PrayerRequestsState>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<PublicPrayerRequestResponse>>> {
    let prayers = state
        .prayers
        .find(
            Filter::new().brand(query.brand()).eq("is_anonymous", false),
            FindOptions::newest_first(FEED_LIMIT),
        )
        .await?;
    Ok(Json(prayers.into_iter().map(Into::into).collect()))
}

/// Move a prayer request through new, praying and answered
#[utoipa::path(
    put,
    path = "/api/prayer-requests/{id}/status",
    tag = "prayer-requests",
    params(("id" = String, Path, description = "Prayer request ID"), StatusQuery),
    responses(
        (status = 200, description = "Status updated", body = MessageResponse),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Prayer request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_prayer_status(
    State(state): State<PrayerRequestsState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<MessageResponse>> {
    let status: PrayerStatus = query.status.parse()?;
    if !state.prayers.set_fields(&id, doc! { "status": status.as_str() }).await? {
        return Err(PlatformError::not_found("PrayerRequest", &id));
    }
    info!(prayer_id = %id, status = status.as_str(), "Prayer request status changed");
    Ok(Json(MessageResponse::new("Status updated")))
}

pub fn prayer_requests_router(state: PrayerRequestsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(submit_prayer_request, list_prayer_requests))
        .routes(routes!(list_public_prayer_requests))
        .routes(routes!(set_prayer_status))
        .with_state(state)
}
