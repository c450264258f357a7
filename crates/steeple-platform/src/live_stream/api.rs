//! Live Streams API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::LiveStream;
use crate::shared::api_common::{BrandQuery, MessageResponse, FEED_LIMIT};
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::AdminAuth;
use crate::shared::validation::require_text;
use crate::store::{Filter, FindOptions, Repository};

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LiveStreamQuery {
    pub brand_id: Option<String>,
    pub is_live: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LiveStreamRequest {
    pub brand_id: String,
    pub title: String,
    pub description: Option<String>,
    pub stream_url: String,
    pub thumbnail_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_live: bool,
    pub scheduled_time: Option<String>,
}

impl LiveStreamRequest {
    fn into_stream(self, id: String, created_at: DateTime<Utc>) -> Result<LiveStream> {
        require_text("brand_id", &self.brand_id)?;
        require_text("title", &self.title)?;
        require_text("stream_url", &self.stream_url)?;
        Ok(LiveStream {
            id,
            brand_id: self.brand_id,
            title: self.title,
            description: self.description,
            stream_url: self.stream_url,
            thumbnail_url: self.thumbnail_url,
            is_live: self.is_live,
            scheduled_time: self.scheduled_time,
            created_at,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LiveStreamResponse {
    pub id: String,
    pub brand_id: String,
    pub title: String,
    pub description: Option<String>,
    pub stream_url: String,
    pub thumbnail_url: Option<String>,
    pub is_live: bool,
    pub scheduled_time: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<LiveStream> for LiveStreamResponse {
    fn from(s: LiveStream) -> Self {
        Self {
            id: s.id,
            brand_id: s.brand_id,
            title: s.title,
            description: s.description,
            stream_url: s.stream_url,
            thumbnail_url: s.thumbnail_url,
            is_live: s.is_live,
            scheduled_time: s.scheduled_time,
            created_at: s.created_at,
        }
    }
}

#[derive(Clone)]
pub struct LiveStreamsState {
    pub streams: Repository<LiveStream>,
}

/// List live streams, newest first
#[utoipa::path(
    get,
    path = "/api/live-streams",
    tag = "live-streams",
    params(LiveStreamQuery),
    responses((status = 200, description = "Live streams", body = Vec<LiveStreamResponse>))
)]
pub async fn list_streams(
    State(state): State<LiveStreamsState>,
    Query(query): Query<LiveStreamQuery>,
) -> Result<Json<Vec<LiveStreamResponse>>> {
    let filter = Filter::new()
        .brand(query.brand_id.as_deref().filter(|b| !b.is_empty()))
        .eq_opt("is_live", query.is_live);

    let streams = state
        .streams
        .find(filter, FindOptions::newest_first(FEED_LIMIT))
        .await?;
    Ok(Json(streams.into_iter().map(Into::into).collect()))
}

/// The stream currently on air, or `null`
#[utoipa::path(
    get,
    path = "/api/live-streams/active",
    tag = "live-streams",
    params(BrandQuery),
    responses((status = 200, description = "Active stream or null", body = Option<LiveStreamResponse>))
)]
pub async fn get_active_stream(
    State(state): State<LiveStreamsState>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Option<LiveStreamResponse>>> {
    let stream = state
        .streams
        .find(
            Filter::new().brand(query.brand()).eq("is_live", true),
            FindOptions::newest_first(1),
        )
        .await?
        .into_iter()
        .next();
    Ok(Json(stream.map(Into::into)))
}

/// Create a live stream
#[utoipa::path(
    post,
    path = "/api/live-streams",
    tag = "live-streams",
    request_body = LiveStreamRequest,
    responses((status = 201, description = "Live stream created", body = LiveStreamResponse)),
    security(("bearer_auth" = []))
)]
pub async fn create_stream(
    State(state): State<LiveStreamsState>,
    _admin: AdminAuth,
    Json(req): Json<LiveStreamRequest>,
) -> Result<(StatusCode, Json<LiveStreamResponse>)> {
    let stream = req.into_stream(uuid::Uuid::new_v4().to_string(), Utc::now())?;
    state.streams.insert(&stream).await?;
    Ok((StatusCode::CREATED, Json(stream.into())))
}

/// Replace a live stream
#[utoipa::path(
    put,
    path = "/api/live-streams/{id}",
    tag = "live-streams",
    params(("id" = String, Path, description = "Live stream ID")),
    request_body = LiveStreamRequest,
    responses(
        (status = 200, description = "Live stream updated", body = LiveStreamResponse),
        (status = 404, description = "Live stream not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_stream(
    State(state): State<LiveStreamsState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(req): Json<LiveStreamRequest>,
) -> Result<Json<LiveStreamResponse>> {
    let existing = state
        .streams
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("LiveStream", &id))?;

    let stream = req.into_stream(existing.id, existing.created_at)?;
    if !state.streams.replace(&stream).await? {
        return Err(PlatformError::not_found("LiveStream", &id));
    }
    Ok(Json(stream.into()))
}

/// Delete a live stream
#[utoipa::path(
    delete,
    path = "/api/live-streams/{id}",
    tag = "live-streams",
    params(("id" = String, Path, description = "Live stream ID")),
    responses(
        (status = 200, description = "Live stream deleted", body = MessageResponse),
        (status = 404, description = "Live stream not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_stream(
    State(state): State<LiveStreamsState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.streams.delete(&id).await? {
        return Err(PlatformError::not_found("LiveStream", &id));
    }
    Ok(Json(MessageResponse::new("Live stream deleted")))
}

pub fn live_streams_router(state: LiveStreamsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_streams, create_stream))
        .routes(routes!(get_active_stream))
        .routes(routes!(update_stream, delete_stream))
        .with_state(state)
}
