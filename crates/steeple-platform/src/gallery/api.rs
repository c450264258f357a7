//! Gallery API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::GalleryImage;
use crate::shared::api_common::{MessageResponse, LIST_LIMIT};
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::AdminAuth;
use crate::shared::validation::require_text;
use crate::store::{Filter, FindOptions, Repository};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GalleryQuery {
    pub brand_id: Option<String>,
    pub event_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GalleryImageRequest {
    pub brand_id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub event_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GalleryImageResponse {
    pub id: String,
    pub brand_id: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub event_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<GalleryImage> for GalleryImageResponse {
    fn from(g: GalleryImage) -> Self {
        Self {
            id: g.id,
            brand_id: g.brand_id,
            title: g.title,
            description: g.description,
            image_url: g.image_url,
            event_id: g.event_id,
            created_at: g.created_at,
        }
    }
}

#[derive(Clone)]
pub struct GalleryState {
    pub images: Repository<GalleryImage>,
}

/// List gallery images
#[utoipa::path(
    get,
    path = "/api/gallery",
    tag = "gallery",
    params(GalleryQuery),
    responses((status = 200, description = "Images", body = Vec<GalleryImageResponse>))
)]
pub async fn list_images(
    State(state): State<GalleryState>,
    Query(query): Query<GalleryQuery>,
) -> Result<Json<Vec<GalleryImageResponse>>> {
    let filter = Filter::new()
        .brand(query.brand_id.as_deref().filter(|b| !b.is_empty()))
        .eq_opt("event_id", query.event_id.as_deref().filter(|e| !e.is_empty()));

    let images = state
        .images
        .find(filter, FindOptions::newest_first(LIST_LIMIT))
        .await?;
    Ok(Json(images.into_iter().map(Into::into).collect()))
}

/// Add an image
#[utoipa::path(
    post,
    path = "/api/gallery",
    tag = "gallery",
    request_body = GalleryImageRequest,
    responses((status = 201, description = "Image added", body = GalleryImageResponse)),
    security(("bearer_auth" = []))
)]
pub async fn add_image(
    State(state): State<GalleryState>,
    _admin: AdminAuth,
    Json(req): Json<GalleryImageRequest>,
) -> Result<(StatusCode, Json<GalleryImageResponse>)> {
    require_text("brand_id", &req.brand_id)?;
    require_text("title", &req.title)?;
    require_text("image_url", &req.image_url)?;

    let image = GalleryImage {
        id: uuid::Uuid::new_v4().to_string(),
        brand_id: req.brand_id,
        title: req.title,
        description: req.description,
        image_url: req.image_url,
        event_id: req.event_id,
        created_at: Utc::now(),
    };
    state.images.insert(&image).await?;
    Ok((StatusCode::CREATED, Json(image.into())))
}

/// Remove an image
#[utoipa::path(
    delete,
    path = "/api/gallery/{id}",
    tag = "gallery",
    params(("id" = String, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Image deleted", body = MessageResponse),
        (status = 404, description = "Image not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_image(
    State(state): State<GalleryState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.images.delete(&id).await? {
        return Err(PlatformError::not_found("GalleryImage", &id));
    }
    Ok(Json(MessageResponse::new("Image deleted")))
}

pub fn gallery_router(state: GalleryState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_images, add_image))
        .routes(routes!(delete_image))
        .with_state(state)
}
