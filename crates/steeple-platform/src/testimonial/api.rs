//! Testimonials API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::Testimonial;
use crate::shared::api_common::{MessageResponse, LIST_LIMIT};
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::AdminAuth;
use crate::shared::validation::require_text;
use crate::store::{Filter, FindOptions, Repository};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TestimonialQuery {
    pub brand_id: Option<String>,
    /// Only featured (`true`) or only non-featured (`false`) testimonials
    pub featured: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TestimonialRequest {
    pub brand_id: String,
    pub name: String,
    pub content: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl TestimonialRequest {
    fn into_testimonial(self, id: String, created_at: DateTime<Utc>) -> Result<Testimonial> {
        require_text("brand_id", &self.brand_id)?;
        require_text("name", &self.name)?;
        require_text("content", &self.content)?;
        Ok(Testimonial {
            id,
            brand_id: self.brand_id,
            name: self.name,
            content: self.content,
            image_url: self.image_url,
            featured: self.featured,
            created_at,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TestimonialResponse {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub content: String,
    pub image_url: Option<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Testimonial> for TestimonialResponse {
    fn from(t: Testimonial) -> Self {
        Self {
            id: t.id,
            brand_id: t.brand_id,
            name: t.name,
            content: t.content,
            image_url: t.image_url,
            featured: t.featured,
            created_at: t.created_at,
        }
    }
}

#[derive(Clone)]
pub struct TestimonialsState {
    pub testimonials: Repository<Testimonial>,
}

/// List testimonials
#[utoipa::path(
    get,
    path = "/api/testimonials",
    tag = "testimonials",
    params(TestimonialQuery),
    responses((status = 200, description = "Testimonials", body = Vec<TestimonialResponse>))
)]
pub async fn list_testimonials(
    State(state): State<TestimonialsState>,
    Query(query): Query<TestimonialQuery>,
) -> Result<Json<Vec<TestimonialResponse>>> {
    let brand = query.brand_id.as_deref().filter(|b| !b.is_empty());
    let filter = Filter::new().brand(brand).eq_opt("featured", query.featured);

    let testimonials = state
        .testimonials
        .find(filter, FindOptions::newest_first(LIST_LIMIT))
        .await?;
    Ok(Json(testimonials.into_iter().map(Into::into).collect()))
}

/// Add a testimonial
#[utoipa::path(
    post,
    path = "/api/testimonials",
    tag = "testimonials",
    request_body = TestimonialRequest,
    responses((status = 201, description = "Testimonial created", body = TestimonialResponse)),
    security(("bearer_auth" = []))
)]
pub async fn create_testimonial(
    State(state): State<TestimonialsState>,
    _admin: AdminAuth,
    Json(req): Json<TestimonialRequest>,
) -> Result<(StatusCode, Json<TestimonialResponse>)> {
    let testimonial = req.into_testimonial(uuid::Uuid::new_v4().to_string(), Utc::now())?;
    state.testimonials.insert(&testimonial).await?;
    Ok((StatusCode::CREATED, Json(testimonial.into())))
}

/// Replace a testimonial
#[utoipa::path(
    put,
    path = "/api/testimonials/{id}",
    tag = "testimonials",
    params(("id" = String, Path, description = "Testimonial ID")),
    request_body = TestimonialRequest,
    responses(
        (status = 200, description = "Testimonial updated", body = TestimonialResponse),
        (status = 404, description = "Testimonial not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_testimonial(
    State(state): State<TestimonialsState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(req): Json<TestimonialRequest>,
) -> Result<Json<TestimonialResponse>> {
    let existing = state
        .testimonials
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Testimonial", &id))?;

    let testimonial = req.into_testimonial(existing.id, existing.created_at)?;
    if !state.testimonials.replace(&testimonial).await? {
        return Err(PlatformError::not_found("Testimonial", &id));
    }
    Ok(Json(testimonial.into()))
}

/// Delete a testimonial
#[utoipa::path(
    delete,
    path = "/api/testimonials/{id}",
    tag = "testimonials",
    params(("id" = String, Path, description = "Testimonial ID")),
    responses(
        (status = 200, description = "Testimonial deleted", body = MessageResponse),
        (status = 404, description = "Testimonial not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_testimonial(
    State(state): State<TestimonialsState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.testimonials.delete(&id).await? {
        return Err(PlatformError::not_found("Testimonial", &id));
    }
    Ok(Json(MessageResponse::new("Testimonial deleted")))
}

pub fn testimonials_router(state: TestimonialsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_testimonials, create_testimonial))
        .routes(routes!(update_testimonial, delete_testimonial))
        .with_state(state)
}
