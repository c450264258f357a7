//! Giving Categories API

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::GivingCategory;
use crate::shared::api_common::{BrandQuery, MessageResponse, FEED_LIMIT};
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::AdminAuth;
use crate::shared::validation::require_text;
use crate::store::{Filter, FindOptions, Repository};

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GivingCategoryRequest {
    pub brand_id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl GivingCategoryRequest {
    fn into_category(self, id: String, created_at: DateTime<Utc>) -> Result<GivingCategory> {
        require_text("brand_id", &self.brand_id)?;
        require_text("name", &self.name)?;
        Ok(GivingCategory {
            id,
            brand_id: self.brand_id,
            name: self.name,
            description: self.description,
            is_active: self.is_active,
            created_at,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GivingCategoryResponse {
    pub id: String,
    pub brand_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<GivingCategory> for GivingCategoryResponse {
    fn from(c: GivingCategory) -> Self {
        Self {
            id: c.id,
            brand_id: c.brand_id,
            name: c.name,
            description: c.description,
            is_active: c.is_active,
            created_at: c.created_at,
        }
    }
}

#[derive(Clone)]
pub struct GivingCategoriesState {
    pub categories: Repository<GivingCategory>,
}

/// List active giving categories
#[utoipa::path(
    get,
    path = "/api/giving-categories",
    tag = "giving",
    params(BrandQuery),
    responses((status = 200, description = "Active categories", body = Vec<GivingCategoryResponse>))
)]
pub async fn list_categories(
    State(state): State<GivingCategoriesState>,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<GivingCategoryResponse>>> {
    let categories = state
        .categories
        .find(
            Filter::new().brand(query.brand()).eq("is_active", true),
            FindOptions::limit(FEED_LIMIT),
        )
        .await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// Create a giving category
#[utoipa::path(
    post,
    path = "/api/giving-categories",
    tag = "giving",
    request_body = GivingCategoryRequest,
    responses((status = 201, description = "Category created", body = GivingCategoryResponse)),
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    State(state): State<GivingCategoriesState>,
    _admin: AdminAuth,
    Json(req): Json<GivingCategoryRequest>,
) -> Result<(StatusCode, Json<GivingCategoryResponse>)> {
    let category = req.into_category(uuid::Uuid::new_v4().to_string(), Utc::now())?;
    state.categories.insert(&category).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

/// Replace a giving category
#[utoipa::path(
    put,
    path = "/api/giving-categories/{id}",
    tag = "giving",
    params(("id" = String, Path, description = "Category ID")),
    request_body = GivingCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = GivingCategoryResponse),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_category(
    State(state): State<GivingCategoriesState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(req): Json<GivingCategoryRequest>,
) -> Result<Json<GivingCategoryResponse>> {
    let existing = state
        .categories
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("GivingCategory", &id))?;

    let category = req.into_category(existing.id, existing.created_at)?;
    if !state.categories.replace(&category).await? {
        return Err(PlatformError::not_found("GivingCategory", &id));
    }
    Ok(Json(category.into()))
}

/// Delete a giving category
#[utoipa::path(
    delete,
    path = "/api/giving-categories/{id}",
    tag = "giving",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    State(state): State<GivingCategoriesState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.categories.delete(&id).await? {
        return Err(PlatformError::not_found("GivingCategory", &id));
    }
    Ok(Json(MessageResponse::new("Category deleted")))
}

pub fn giving_categories_router(state: GivingCategoriesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_categories, create_category))
        .routes(routes!(update_category, delete_category))
        .with_state(state)
}
