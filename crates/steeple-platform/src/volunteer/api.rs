//! Volunteers API

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

use super::entity::{VolunteerApplication, NEW_APPLICATION_STATUS};
use crate::shared::api_common::{BrandQuery, MessageResponse, StatusQuery, LIST_LIMIT};
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::AdminAuth;
use crate::shared::validation::{normalize_email, require_text};
use crate::store::{Filter, FindOptions, Repository};

#[derive(Debug, Deserialize, ToSchema)]
pub struct VolunteerApplicationRequest {
    pub brand_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub ministry: String,
    pub availability: String,
    pub skills: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VolunteerApplicationResponse {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub ministry: String,
    pub availability: String,
    pub skills: Option<String>,
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<VolunteerApplication> for VolunteerApplicationResponse {
    fn from(v: VolunteerApplication) -> Self {
        Self {
            id: v.id,
            brand_id: v.brand_id,
            name: v.name,
            email: v.email,
            phone: v.phone,
            ministry: v.ministry,
            availability: v.availability,
            skills: v.skills,
            message: v.message,
            status: v.status,
            created_at: v.created_at,
        }
    }
}

#[derive(Clone)]
pub struct VolunteersState {
    pub applications: Repository<VolunteerApplication>,
}

/// Submit a volunteer application
#[utoipa::path(
    post,
    path = "/api/volunteers",
    tag = "volunteers",
    request_body = VolunteerApplicationRequest,
    responses(
        (status = 201, description = "Application received", body = VolunteerApplicationResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn submit_application(
    State(state): State<VolunteersState>,
    Json(req): Json<VolunteerApplicationRequest>,
) -> Result<(StatusCode, Json<VolunteerApplicationResponse>)> {
    require_text("brand_id", &req.brand_id)?;
    require_text("name", &req.name)?;
    require_text("ministry", &req.ministry)?;

    let application = VolunteerApplication {
        id: uuid::Uuid::new_v4().to_string(),
        brand_id: req.brand_id,
        name: req.name,
        email: normalize_email(&req.email)?,
        phone: req.phone,
        ministry: req.ministry,
        availability: req.availability,
        skills: req.skills,
        message: req.message,
        status: NEW_APPLICATION_STATUS.to_string(),
        created_at: Utc::now(),
    };
    state.applications.insert(&application).await?;

    info!(application_id = %application.id, ministry = %application.ministry, "Volunteer application received");
    Ok((StatusCode::CREATED, Json(application.into())))
}

/// List volunteer applications
#[utoipa::path(
    get,
    path = "/api/volunteers",
    tag = "volunteers",
    params(BrandQuery),
    responses((status = 200, description = "Applications", body = Vec<VolunteerApplicationResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_applications(
    State(state): State<VolunteersState>,
    _admin: AdminAuth,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<VolunteerApplicationResponse>>> {
    let applications = state
        .applications
        .find(Filter::new().brand(query.brand()), FindOptions::newest_first(LIST_LIMIT))
        .await?;
    Ok(Json(applications.into_iter().map(Into::into).collect()))
}

/// Set an application's workflow status
#[utoipa::path(
    put,
    path = "/api/volunteers/{id}/status",
    tag = "volunteers",
    params(("id" = String, Path, description = "Application ID"), StatusQuery),
    responses(
        (status = 200, description = "Status updated", body = MessageResponse),
        (status = 404, description = "Application not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_application_status(
    State(state): State<VolunteersState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<MessageResponse>> {
    require_text("status", &query.status)?;
    if !state.applications.set_fields(&id, doc! { "status": query.status.as_str() }).await? {
        return Err(PlatformError::not_found("VolunteerApplication", &id));
    }
    Ok(Json(MessageResponse::new("Status updated")))
}

pub fn volunteers_router(state: VolunteersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(submit_application, list_applications))
        .routes(routes!(set_application_status))
        .with_state(state)
}
