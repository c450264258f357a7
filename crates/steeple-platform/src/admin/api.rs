//! Admin Auth API
//!
//! Registration, login and identity for site administrators.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::Admin;
use crate::auth::{AuthService, PasswordService, Role};
use crate::shared::error::PlatformError;
use crate::shared::middleware::AdminAuth;
use crate::shared::validation::normalize_email;
use crate::store::{Filter, Repository};

/// Admin credentials
#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminResponse {
    pub id: String,
    pub email: String,
    /// Always `admin`
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<Admin> for AdminResponse {
    fn from(a: Admin) -> Self {
        Self {
            id: a.id,
            email: a.email,
            role: "admin".to_string(),
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminTokenResponse {
    pub token: String,
    pub admin: AdminResponse,
}

#[derive(Clone)]
pub struct AdminState {
    pub admins: Repository<Admin>,
    pub auth_service: Arc<AuthService>,
    pub password_service: Arc<PasswordService>,
}

/// Register an admin
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = AdminCredentials,
    responses(
        (status = 201, description = "Admin registered", body = AdminTokenResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_admin(
    State(state): State<AdminState>,
    Json(req): Json<AdminCredentials>,
) -> Result<(StatusCode, Json<AdminTokenResponse>), PlatformError> {
    let email = normalize_email(&req.email)?;

    if state.admins.find_one(Filter::new().eq("email", email.as_str())).await?.is_some() {
        return Err(PlatformError::duplicate("Admin", "email", email));
    }

    let password_hash = state.password_service.hash_password(&req.password)?;
    let admin = Admin::new(email, password_hash);
    state.admins.insert(&admin).await?;

    let token = state.auth_service.issue_token(&admin.id, &admin.email, Role::Admin)?;
    info!(admin_id = %admin.id, "Admin registered");

    Ok((
        StatusCode::CREATED,
        Json(AdminTokenResponse { token, admin: admin.into() }),
    ))
}

/// Admin login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = AdminCredentials,
    responses(
        (status = 200, description = "Logged in", body = AdminTokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login_admin(
    State(state): State<AdminState>,
    Json(req): Json<AdminCredentials>,
) -> Result<Json<AdminTokenResponse>, PlatformError> {
    let email = req.email.trim().to_lowercase();

    let admin = state
        .admins
        .find_one(Filter::new().eq("email", email.as_str()))
        .await?
        .ok_or(PlatformError::InvalidCredentials)?;

    if !state.password_service.verify_password(&req.password, &admin.password_hash)? {
        return Err(PlatformError::InvalidCredentials);
    }

    let token = state.auth_service.issue_token(&admin.id, &admin.email, Role::Admin)?;
    Ok(Json(AdminTokenResponse { token, admin: admin.into() }))
}

/// Current admin
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current admin", body = AdminResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(AdminAuth(admin): AdminAuth) -> Json<AdminResponse> {
    Json(admin.into())
}

pub fn admin_auth_router(state: AdminState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(register_admin))
        .routes(routes!(login_admin))
        .routes(routes!(get_me))
        .with_state(state)
}
