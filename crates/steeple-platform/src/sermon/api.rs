//! Sermons API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::Sermon;
use crate::shared::api_common::{BrandQuery, MessageResponse, LIST_LIMIT};
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::AdminAuth;
use crate::shared::validation::require_text;
use crate::store::{Filter, FindOptions, Repository};

const MEDIA_TYPES: &[&str] = &["video", "audio"];

#[derive(Debug, Deserialize, ToSchema)]
pub struct SermonRequest {
    pub brand_id: String,
    pub title: String,
    pub description: String,
    pub speaker: String,
    pub date: String,
    /// `video` or `audio`
    pub media_type: String,
    pub media_url: String,
    pub thumbnail_url: Option<String>,
    pub transcript: Option<String>,
}

impl SermonRequest {
    fn into_sermon(self, id: String, created_at: DateTime<Utc>) -> Result<Sermon> {
        require_text("brand_id", &self.brand_id)?;
        require_text("title", &self.title)?;
        require_text("media_url", &self.media_url)?;

        let media_type = self.media_type.trim().to_lowercase();
        if !MEDIA_TYPES.contains(&media_type.as_str()) {
            return Err(PlatformError::validation(format!(
                "Invalid media_type '{}', expected video or audio",
                self.media_type
            )));
        }

        Ok(Sermon {
            id,
            brand_id: self.brand_id,
            title: self.title,
            description: self.description,
            speaker: self.speaker,
            date: self.date,
            media_type,
            media_url: self.media_url,
            thumbnail_url: self.thumbnail_url,
            transcript: self.transcript,
            created_at,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SermonResponse {
    pub id: String,
    pub brand_id: String,
    pub title: String,
    pub description: String,
    pub speaker: String,
    pub date: String,
    pub media_type: String,
    pub media_url: String,
    pub thumbnail_url: Option<String>,
    pub transcript: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Sermon> for SermonResponse {
    fn from(s: Sermon) -> Self {
        Self {
            id: s.id,
            brand_id: s.brand_id,
            title: s.title,
            description: s.description,
            speaker: s.speaker,
            date: s.date,
            media_type: s.media_type,
            media_url: s.media_url,
            thumbnail_url: s.thumbnail_url,
            transcript: s.transcript,
            created_at: s.created_at,
        }
    }
}

#[derive(Clone)]
pub struct SermonsState {
    pub sermons: Repository<Sermon>,
}

/// List sermons
#[utoipa::path(
    get,
    path = "/api/sermons",
    tag = "sermons",
    params(BrandQuery),
    responses((status = 200, description = "Sermons", body = Vec<SermonResponse>))
)]
pub async fn list_sermons(
    State(state): State<SermonsState>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<SermonResponse>>> {
    let sermons = state
        .sermons
        .find(Filter::new().brand(query.brand()), FindOptions::newest_first(LIST_LIMIT))
        .await?;
    Ok(Json(sermons.into_iter().map(Into::into).collect()))
}

/// Get a sermon
#[utoipa::path(
    get,
    path = "/api/sermons/{id}",
    tag = "sermons",
    params(("id" = String, Path, description = "Sermon ID")),
    responses(
        (status = 200, description = "Sermon", body = SermonResponse),
        (status = 404, description = "Sermon not found")
    )
)]
pub async fn get_sermon(
    State(state): State<SermonsState>,
    Path(id): Path<String>,
) -> Result<Json<SermonResponse>> {
    let sermon = state
        .sermons
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Sermon", &id))?;
    Ok(Json(sermon.into()))
}

/// Publish a sermon
#[utoipa::path(
    post,
    path = "/api/sermons",
    tag = "sermons",
    request_body = SermonRequest,
    responses((status = 201, description = "Sermon created", body = SermonResponse)),
    security(("bearer_auth" = []))
)]
pub async fn create_sermon(
    State(state): State<SermonsState>,
    _admin: AdminAuth,
    Json(req): Json<SermonRequest>,
) -> Result<(StatusCode, Json<SermonResponse>)> {
    let sermon = req.into_sermon(uuid::Uuid::new_v4().to_string(), Utc::now())?;
    state.sermons.insert(&sermon).await?;
    Ok((StatusCode::CREATED, Json(sermon.into())))
}

/// Replace a sermon
#[utoipa::path(
    put,
    path = "/api/sermons/{id}",
    tag = "sermons",
    params(("id" = String, Path, description = "Sermon ID")),
    request_body = SermonRequest,
    responses(
        (status = 200, description = "Sermon updated", body = SermonResponse),
        (status = 404, description = "Sermon not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_sermon(
    State(state): State<SermonsState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(req): Json<SermonRequest>,
) -> Result<Json<SermonResponse>> {
    let existing = state
        .sermons
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Sermon", &id))?;

    let sermon = req.into_sermon(existing.id, existing.created_at)?;
    if !state.sermons.replace(&sermon).await? {
        return Err(PlatformError::not_found("Sermon", &id));
    }
    Ok(Json(sermon.into()))
}

/// Delete a sermon
#[utoipa::path(
    delete,
    path = "/api/sermons/{id}",
    tag = "sermons",
    params(("id" = String, Path, description = "Sermon ID")),
    responses(
        (status = 200, description = "Sermon deleted", body = MessageResponse),
        (status = 404, description = "Sermon not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_sermon(
    State(state): State<SermonsState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.sermons.delete(&id).await? {
        return Err(PlatformError::not_found("Sermon", &id));
    }
    Ok(Json(MessageResponse::new("Sermon deleted")))
}

pub fn sermons_router(state: SermonsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_sermons, create_sermon))
        .routes(routes!(get_sermon, update_sermon, delete_sermon))
        .with_state(state)
}
