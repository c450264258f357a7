//! Ministries API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::Ministry;
use crate::shared::api_common::{BrandQuery, MessageResponse, LIST_LIMIT};
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::AdminAuth;
use crate::shared::validation::require_text;
use crate::store::{Filter, FindOptions, Repository};

#[derive(Debug, Deserialize, ToSchema)]
pub struct MinistryRequest {
    pub brand_id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
}

impl MinistryRequest {
    fn into_ministry(self, id: String, created_at: DateTime<Utc>) -> Result<Ministry> {
        require_text("brand_id", &self.brand_id)?;
        require_text("title", &self.title)?;
        Ok(Ministry {
            id,
            brand_id: self.brand_id,
            title: self.title,
            description: self.description,
            image_url: self.image_url,
            created_at,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MinistryResponse {
    pub id: String,
    pub brand_id: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Ministry> for MinistryResponse {
    fn from(m: Ministry) -> Self {
        Self {
            id: m.id,
            brand_id: m.brand_id,
            title: m.title,
            description: m.description,
            image_url: m.image_url,
            created_at: m.created_at,
        }
    }
}

#[derive(Clone)]
pub struct MinistriesState {
    pub ministries: Repository<Ministry>,
}

/// List ministries
#[utoipa::path(
    get,
    path = "/api/ministries",
    tag = "ministries",
    params(BrandQuery),
    responses((status = 200, description = "Ministries", body = Vec<MinistryResponse>))
)]
pub async fn list_ministries(
    State(state): State<MinistriesState>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<MinistryResponse>>> {
    let ministries = state
        .ministries
        .find(Filter::new().brand(query.brand()), FindOptions::limit(LIST_LIMIT))
        .await?;
    Ok(Json(ministries.into_iter().map(Into::into).collect()))
}

/// Create a ministry
#[utoipa::path(
    post,
    path = "/api/ministries",
    tag = "ministries",
    request_body = MinistryRequest,
    responses((status = 201, description = "Ministry created", body = MinistryResponse)),
    security(("bearer_auth" = []))
)]
pub async fn create_ministry(
    State(state): State<MinistriesState>,
    _admin: AdminAuth,
    Json(req): Json<MinistryRequest>,
) -> Result<(StatusCode, Json<MinistryResponse>)> {
    let ministry = req.into_ministry(uuid::Uuid::new_v4().to_string(), Utc::now())?;
    state.ministries.insert(&ministry).await?;
    Ok((StatusCode::CREATED, Json(ministry.into())))
}

/// Replace a ministry
#[utoipa::path(
    put,
    path = "/api/ministries/{id}",
    tag = "ministries",
    params(("id" = String, Path, description = "Ministry ID")),
    request_body = MinistryRequest,
    responses(
        (status = 200, description = "Ministry updated", body = MinistryResponse),
        (status = 404, description = "Ministry not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_ministry(
    State(state): State<MinistriesState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(req): Json<MinistryRequest>,
) -> Result<Json<MinistryResponse>> {
    let existing = state
        .ministries
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Ministry", &id))?;

    let ministry = req.into_ministry(existing.id, existing.created_at)?;
    if !state.ministries.replace(&ministry).await? {
        return Err(PlatformError::not_found("Ministry", &id));
    }
    Ok(Json(ministry.into()))
}

/// Delete a ministry
#[utoipa::path(
    delete,
    path = "/api/ministries/{id}",
    tag = "ministries",
    params(("id" = String, Path, description = "Ministry ID")),
    responses(
        (status = 200, description = "Ministry deleted", body = MessageResponse),
        (status = 404, description = "Ministry not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_ministry(
    State(state): State<MinistriesState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.ministries.delete(&id).await? {
        return Err(PlatformError::not_found("Ministry", &id));
    }
    Ok(Json(MessageResponse::new("Ministry deleted")))
}

pub fn ministries_router(state: MinistriesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_ministries, create_ministry))
        .routes(routes!(update_ministry, delete_ministry))
        .with_state(state)
}
