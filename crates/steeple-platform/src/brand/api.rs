//! Brands API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::{Brand, DEFAULT_PRIMARY_COLOR, DEFAULT_SECONDARY_COLOR};
use crate::shared::api_common::FEED_LIMIT;
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::AdminAuth;
use crate::shared::validation::require_text;
use crate::store::{Filter, FindOptions, Repository};

fn default_primary() -> String {
    DEFAULT_PRIMARY_COLOR.to_string()
}

fn default_secondary() -> String {
    DEFAULT_SECONDARY_COLOR.to_string()
}

/// Create/replace brand request
#[derive(Debug, Deserialize, ToSchema)]
pub struct BrandRequest {
    pub name: String,
    /// Public hostname the site is served from
    pub domain: String,
    pub logo_url: Option<String>,
    #[serde(default = "default_primary")]
    pub primary_color: String,
    #[serde(default = "default_secondary")]
    pub secondary_color: String,
    pub tagline: Option<String>,
    pub hero_video_url: Option<String>,
    pub hero_image_url: Option<String>,
    pub service_times: Option<String>,
    pub location: Option<String>,
}

impl BrandRequest {
    fn apply(self, mut brand: Brand) -> Result<Brand> {
        require_text("name", &self.name)?;
        require_text("domain", &self.domain)?;
        brand.name = self.name;
        brand.domain = self.domain;
        brand.logo_url = self.logo_url;
        brand.primary_color = self.primary_color;
        brand.secondary_color = self.secondary_color;
        brand.tagline = self.tagline;
        brand.hero_video_url = self.hero_video_url;
        brand.hero_image_url = self.hero_image_url;
        brand.service_times = self.service_times;
        brand.location = self.location;
        Ok(brand)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BrandResponse {
    pub id: String,
    pub name: String,
    pub domain: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub secondary_color: String,
    pub tagline: Option<String>,
    pub hero_video_url: Option<String>,
    pub hero_image_url: Option<String>,
    pub service_times: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Brand> for BrandResponse {
    fn from(b: Brand) -> Self {
        Self {
            id: b.id,
            name: b.name,
            domain: b.domain,
            logo_url: b.logo_url,
            primary_color: b.primary_color,
            secondary_color: b.secondary_color,
            tagline: b.tagline,
            hero_video_url: b.hero_video_url,
            hero_image_url: b.hero_image_url,
            service_times: b.service_times,
            location: b.location,
            created_at: b.created_at,
        }
    }
}

#[derive(Clone)]
pub struct BrandsState {
    pub brands: Repository<Brand>,
}

/// List brands
#[utoipa::path(
    get,
    path = "/api/brands",
    tag = "brands",
    responses((status = 200, description = "Brands", body = Vec<BrandResponse>))
)]
pub async fn list_brands(State(state): State<BrandsState>) -> Result<Json<Vec<BrandResponse>>> {
    let brands = state.brands.find(Filter::new(), FindOptions::limit(FEED_LIMIT)).await?;
    Ok(Json(brands.into_iter().map(Into::into).collect()))
}

/// Get brand by ID
#[utoipa::path(
    get,
    path = "/api/brands/{id}",
    tag = "brands",
    params(("id" = String, Path, description = "Brand ID")),
    responses(
        (status = 200, description = "Brand found", body = BrandResponse),
        (status = 404, description = "Brand not found")
    )
)]
pub async fn get_brand(
    State(state): State<BrandsState>,
    Path(id): Path<String>,
) -> Result<Json<BrandResponse>> {
    let brand = state
        .brands
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Brand", &id))?;
    Ok(Json(brand.into()))
}

/// Create a brand
#[utoipa::path(
    post,
    path = "/api/brands",
    tag = "brands",
    request_body = BrandRequest,
    responses(
        (status = 201, description = "Brand created", body = BrandResponse),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_brand(
    State(state): State<BrandsState>,
    _admin: AdminAuth,
    Json(req): Json<BrandRequest>,
) -> Result<(StatusCode, Json<BrandResponse>)> {
    let brand = req.apply(Brand::new("", ""))?;
    state.brands.insert(&brand).await?;
    info!(brand_id = %brand.id, domain = %brand.domain, "Brand created");
    Ok((StatusCode::CREATED, Json(brand.into())))
}

/// Replace a brand
#[utoipa::path(
    put,
    path = "/api/brands/{id}",
    tag = "brands",
    params(("id" = String, Path, description = "Brand ID")),
    request_body = BrandRequest,
    responses(
        (status = 200, description = "Brand updated", body = BrandResponse),
        (status = 404, description = "Brand not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_brand(
    State(state): State<BrandsState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Json(req): Json<BrandRequest>,
) -> Result<Json<BrandResponse>> {
    let existing = state
        .brands
        .find_by_id(&id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Brand", &id))?;

    let brand = req.apply(existing)?;
    if !state.brands.replace(&brand).await? {
        return Err(PlatformError::not_found("Brand", &id));
    }
    Ok(Json(brand.into()))
}

pub fn brands_router(state: BrandsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_brands, create_brand))
        .routes(routes!(get_brand, update_brand))
        .with_state(state)
}
