//! Announcements API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::Announcement;
use crate::shared::api_common::{BrandQuery, MessageResponse, FEED_LIMIT, LIST_LIMIT};
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::AdminAuth;
use crate::shared::validation::require_text;
use crate::store::{Filter, FindOptions, Repository};

/// Maximum urgent announcements returned for the banner
const URGENT_LIMIT: usize = 10;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnnouncementRequest {
    pub brand_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_urgent: bool,
    /// RFC 3339 timestamp
    pub scheduled_start: Option<DateTime<Utc>>,
    /// RFC 3339 timestamp
    pub scheduled_end: Option<DateTime<Utc>>,
}

impl AnnouncementRequest {
    fn into_announcement(self, id: String, created_at: DateTime<Utc>) -> Result<Announcement> {
        require_text("brand_id", &self.brand_id)?;
        require_text("title", &self.title)?;
        if let (Some(start), Some(end)) = (self.scheduled_start, self.scheduled_end) {
            if end < start {
                return Err(PlatformError::validation("scheduled_end is before scheduled_start"));
            }
        }
        Ok(Announcement {
            id,
            brand_id: self.brand_id,
            title: self.title,
            content: self.content,
            is_urgent: self.is_urgent,
            scheduled_start: self.scheduled_start.map(bson::DateTime::from_chrono),
            scheduled_end: self.scheduled_end.map(bson::DateTime::from_chrono),
            created_at,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnnouncementResponse {
    pub id: String,
    pub brand_id: String,
    pub title: String,
    pub content: String,
    pub is_urgent: bool,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Announcement> for AnnouncementResponse {
    fn from(a: Announcement) -> Self {
        Self {
            id: a.id,
            brand_id: a.brand_id,
            title: a.title,
            content: a.content,
            is_urgent: a.is_urgent,
            scheduled_start: a.scheduled_start.map(|t| t.to_chrono()),
            scheduled_end: a.scheduled_end.map(|t| t.to_chrono()),
            created_at: a.created_at,
        }
    }
}

#[derive(Clone)]
pub struct AnnouncementsState {
    pub announcements: Repository<Announcement>,
}

/// List announcements
#[utoipa::path(
    get,
    path = "/api/announcements",
    tag = "announcements",
    params(BrandQuery),
    responses((status = 200, description = "Announcements", body = Vec<AnnouncementResponse>))
)]
pub async fn list_announcements(
    State(state): State<AnnouncementsState>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<AnnouncementResponse>>> {
    let announcements = state
        .announcements
        .find(Filter::new().brand(query.brand()), FindOptions::newest_first(LIST_LIMIT))
        .await?;
    Ok(Json(announcements.into_iter().map(Into::into).collect()))
}

/// Urgent announcements currently inside their schedule window
#[utoipa::path(
    get,
    path = "/api/announcements/urgent",
    tag = "announcements",
    params(BrandQuery),
    responses((status = 200, description = "Active urgent announcements", body = Vec<AnnouncementResponse>))
)]
pub async fn list_urgent_announcements(
    State(state): State<AnnouncementsState>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<AnnouncementResponse>>> {
    let now = Utc::now();
    let urgent = state
        .announcements
        .find(
            Filter::new().brand(query.brand()).eq("is_urgent", true),
            FindOptions::newest_first(FEED_LIMIT),
        )
        .await?;

    Ok(Json(
        urgent
            .into_iter()
            .filter(|a| a.is_within_window(now))
            .take(URGENT_LIMIT)
            .map(Into::into)
            .collect(),
    ))
}

/// Create an announcement
#[utoipa::path(
    post,
    path = "/api/announcements",
    tag = "announcements",
    request_body = AnnouncementRequest,
    responses((status = 201, description = "Announcement created", body = AnnouncementResponse)),
    security(("bearer_auth" = []))
)]
pub async fn create_announcement(
    State(state): State<AnnouncementsState>,
    _admin: AdminAuth,
    Json(req): Json<AnnouncementRequest>,
) -> Result<(StatusCode, Json<AnnouncementResponse>)> {
    let announcement = req.into_announcement(uuid::Uuid::new_v4().to_string(), Utc::now())?;
    state.announcements.insert(&announcement).await?;
    Ok((StatusCode::CREATED, Json(announcement.into())))
}

/// Replace an announcement
#[utoipa::path(
    put,
    path = "/api/announcements/{id}",
    tag = "announcements",
    params(("id" = String, Path, description = "Announcement ID")),
    request_body = AnnouncementRequest,
    responses(
        (status = 200, description = "Announcement updated", body = AnnouncementResponse),
        (status = 404, description = "Announcement not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_announcement(
    State(state): State<AnnouncementsState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(req): Json<AnnouncementRequest>,
) -> Result<Json<AnnouncementResponse>> {
    let existing = state
        .announcements
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Announcement", &id))?;

    let announcement = req.into_announcement(existing.id, existing.created_at)?;
    if !state.announcements.replace(&announcement).await? {
        return Err(PlatformError::not_found("Announcement", &id));
    }
    Ok(Json(announcement.into()))
}

/// Delete an announcement
#[utoipa::path(
    delete,
    path = "/api/announcements/{id}",
    tag = "announcements",
    params(("id" = String, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement deleted", body = MessageResponse),
        (status = 404, description = "Announcement not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_announcement(
    State(state): State<AnnouncementsState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.announcements.delete(&id).await? {
        return Err(PlatformError::not_found("Announcement", &id));
    }
    Ok(Json(MessageResponse::new("Announcement deleted")))
}

pub fn announcements_router(state: AnnouncementsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_announcements, create_announcement))
        .routes(routes!(list_urgent_announcements))
        .routes(routes!(update_announcement, delete_announcement))
        .with_state(state)
}
