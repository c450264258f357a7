//! Contact API

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::ContactMessage;
use crate::shared::api_common::{BrandQuery, LIST_LIMIT};
use crate::shared::error::Result;
use crate::shared::middleware::AdminAuth;
use crate::shared::validation::{normalize_email, require_text};
use crate::store::{Filter, FindOptions, Repository};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContactRequest {
    pub brand_id: String,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactMessageResponse {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<ContactMessage> for ContactMessageResponse {
    fn from(m: ContactMessage) -> Self {
        Self {
            id: m.id,
            brand_id: m.brand_id,
            name: m.name,
            email: m.email,
            subject: m.subject,
            message: m.message,
            created_at: m.created_at,
        }
    }
}

#[derive(Clone)]
pub struct ContactState {
    pub messages: Repository<ContactMessage>,
}

/// Send a message to the church office
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "contact",
    request_body = ContactRequest,
    responses(
        (status = 201, description = "Message received", body = ContactMessageResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn send_message(
    State(state): State<ContactState>,
    Json(req): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactMessageResponse>)> {
    require_text("brand_id", &req.brand_id)?;
    require_text("name", &req.name)?;
    require_text("message", &req.message)?;

    let message = ContactMessage {
        id: uuid::Uuid::new_v4().to_string(),
        brand_id: req.brand_id,
        name: req.name,
        email: normalize_email(&req.email)?,
        subject: req.subject,
        message: req.message,
        created_at: Utc::now(),
    };
    state.messages.insert(&message).await?;
    Ok((StatusCode::CREATED, Json(message.into())))
}

/// List contact messages
#[utoipa::path(
    get,
    path = "/api/contact",
    tag = "contact",
    params(BrandQuery),
    responses((status = 200, description = "Messages", body = Vec<ContactMessageResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_messages(
    State(state): State<ContactState>,
    _admin: AdminAuth,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<ContactMessageResponse>>> {
    let messages = state
        .messages
        .find(Filter::new().brand(query.brand()), FindOptions::newest_first(LIST_LIMIT))
        .await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

pub fn contact_router(state: ContactState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(send_message, list_messages))
        .with_state(state)
}
