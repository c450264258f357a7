//! Events API
//!
//! Event CRUD plus public registration and admin attendee lists.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::{Event, EventAttendee};
use crate::shared::api_common::{BrandQuery, MessageResponse, LIST_LIMIT};
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::AdminAuth;
use crate::shared::validation::{normalize_email, require_text};
use crate::store::{Filter, FindOptions, Repository};

fn default_true() -> bool {
    true
}

fn default_guests() -> u32 {
    1
}

/// Create/replace event request
#[derive(Debug, Deserialize, ToSchema)]
pub struct EventRequest {
    pub brand_id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: Option<String>,
    pub location: String,
    #[serde(default = "default_true")]
    pub is_free: bool,
    pub image_url: Option<String>,
}

impl EventRequest {
    fn into_event(self, id: String, created_at: DateTime<Utc>) -> Result<Event> {
        require_text("brand_id", &self.brand_id)?;
        require_text("title", &self.title)?;
        require_text("date", &self.date)?;
        Ok(Event {
            id,
            brand_id: self.brand_id,
            title: self.title,
            description: self.description,
            date: self.date,
            time: self.time,
            location: self.location,
            is_free: self.is_free,
            image_url: self.image_url,
            created_at,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventResponse {
    pub id: String,
    pub brand_id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: Option<String>,
    pub location: String,
    pub is_free: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(e: Event) -> Self {
        Self {
            id: e.id,
            brand_id: e.brand_id,
            title: e.title,
            description: e.description,
            date: e.date,
            time: e.time,
            location: e.location,
            is_free: e.is_free,
            image_url: e.image_url,
            created_at: e.created_at,
        }
    }
}

/// Public event registration
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterAttendeeRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(default = "default_guests")]
    pub guests: u32,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendeeResponse {
    pub id: String,
    pub event_id: String,
    pub brand_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub guests: u32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<EventAttendee> for AttendeeResponse {
    fn from(a: EventAttendee) -> Self {
        Self {
            id: a.id,
            event_id: a.event_id,
            brand_id: a.brand_id,
            name: a.name,
            email: a.email,
            phone: a.phone,
            guests: a.guests,
            notes: a.notes,
            created_at: a.created_at,
        }
    }
}

#[derive(Clone)]
pub struct EventsState {
    pub events: Repository<Event>,
    pub attendees: Repository<EventAttendee>,
}

/// List events
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "events",
    params(BrandQuery),
    responses((status = 200, description = "Events", body = Vec<EventResponse>))
)]
pub async fn list_events(
    State(state): State<EventsState>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<EventResponse>>> {
    let events = state
        .events
        .find(Filter::new().brand(query.brand()), FindOptions::newest_first(LIST_LIMIT))
        .await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

/// Get event by ID
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    tag = "events",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event found", body = EventResponse),
        (status = 404, description = "Event not found")
    )
)]
pub async fn get_event(
    State(state): State<EventsState>,
    Path(id): Path<String>,
) -> Result<Json<EventResponse>> {
    let event = state
        .events
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Event", &id))?;
    Ok(Json(event.into()))
}

/// Create an event
#[utoipa::path(
    post,
    path = "/api/events",
    tag = "events",
    request_body = EventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_event(
    State(state): State<EventsState>,
    _admin: AdminAuth,
    Json(req): Json<EventRequest>,
) -> Result<(StatusCode, Json<EventResponse>)> {
    let event = req.into_event(uuid::Uuid::new_v4().to_string(), Utc::now())?;
    state.events.insert(&event).await?;
    info!(event_id = %event.id, brand_id = %event.brand_id, "Event created");
    Ok((StatusCode::CREATED, Json(event.into())))
}

/// Replace an event
#[utoipa::path(
    put,
    path = "/api/events/{id}",
    tag = "events",
    params(("id" = String, Path, description = "Event ID")),
    request_body = EventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_event(
    State(state): State<EventsState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(req): Json<EventRequest>,
) -> Result<Json<EventResponse>> {
    let existing = state
        .events
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Event", &id))?;

    let event = req.into_event(existing.id, existing.created_at)?;
    if !state.events.replace(&event).await? {
        return Err(PlatformError::not_found("Event", &id));
    }
    Ok(Json(event.into()))
}

/// Delete an event
#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    tag = "events",
    params(("id" = String, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event deleted", body = MessageResponse),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_event(
    State(state): State<EventsState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.events.delete(&id).await? {
        return Err(PlatformError::not_found("Event", &id));
    }
    Ok(Json(MessageResponse::new("Event deleted")))
}

/// Register for an event
#[utoipa::path(
    post,
    path = "/api/events/{id}/register",
    tag = "events",
    params(("id" = String, Path, description = "Event ID")),
    request_body = RegisterAttendeeRequest,
    responses(
        (status = 201, description = "Registered", body = AttendeeResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Event not found")
    )
)]
pub async fn register_attendee(
    State(state): State<EventsState>,
    Path(id): Path<String>,
    Json(req): Json<RegisterAttendeeRequest>,
) -> Result<(StatusCode, Json<AttendeeResponse>)> {
    let event = state
        .events
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Event", &id))?;

    require_text("name", &req.name)?;
    let email = normalize_email(&req.email)?;
    if req.guests == 0 {
        return Err(PlatformError::validation("guests must be at least 1"));
    }

    let attendee = EventAttendee {
        id: uuid::Uuid::new_v4().to_string(),
        event_id: event.id,
        brand_id: event.brand_id,
        name: req.name,
        email,
        phone: req.phone,
        guests: req.guests,
        notes: req.notes,
        created_at: Utc::now(),
    };
    state.attendees.insert(&attendee).await?;

    info!(event_id = %attendee.event_id, guests = attendee.guests, "Event registration");
    Ok((StatusCode::CREATED, Json(attendee.into())))
}

/// Attendees of one event
#[utoipa::path(
    get,
    path = "/api/events/{id}/attendees",
    tag = "events",
    params(("id" = String, Path, description = "Event ID")),
    responses((status = 200, description = "Attendees", body = Vec<AttendeeResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_event_attendees(
    State(state): State<EventsState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<Vec<AttendeeResponse>>> {
    let attendees = state
        .attendees
        .find(Filter::new().eq("event_id", id.as_str()), FindOptions::newest_first(LIST_LIMIT))
        .await?;
    Ok(Json(attendees.into_iter().map(Into::into).collect()))
}

/// Attendees across events
#[utoipa::path(
    get,
    path = "/api/attendees",
    tag = "events",
    params(BrandQuery),
    responses((status = 200, description = "Attendees", body = Vec<AttendeeResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_attendees(
    State(state): State<EventsState>,
    _admin: AdminAuth,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<AttendeeResponse>>> {
    let attendees = state
        .attendees
        .find(Filter::new().brand(query.brand()), FindOptions::newest_first(LIST_LIMIT))
        .await?;
    Ok(Json(attendees.into_iter().map(Into::into).collect()))
}

pub fn events_router(state: EventsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_events, create_event))
        .routes(routes!(get_event, update_event, delete_event))
        .routes(routes!(register_attendee))
        .routes(routes!(list_event_attendees))
        .routes(routes!(list_attendees))
        .with_state(state)
}
