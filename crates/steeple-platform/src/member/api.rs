//! Members API
//!
//! Self-service registration/login/profile for members, plus admin
//! management of member accounts.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use bson::doc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::Member;
use crate::auth::{AuthService, PasswordService, Role};
use crate::shared::api_common::{BrandQuery, MessageResponse, LIST_LIMIT};
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::{AdminAuth, MemberAuth};
use crate::shared::validation::{normalize_email, require_text};
use crate::store::{Filter, FindOptions, Repository};

/// Create member request (self-registration and admin create)
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMemberRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub brand_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MemberLoginRequest {
    pub email: String,
    pub password: String,
}

/// Partial profile update; absent fields are left unchanged
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMemberRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MemberStatusQuery {
    pub is_active: bool,
}

/// Member response DTO (never carries the password hash)
#[derive(Debug, Serialize, ToSchema)]
pub struct MemberResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    /// Always `member`
    pub role: String,
    pub brand_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Member> for MemberResponse {
    fn from(m: Member) -> Self {
        Self {
            id: m.id,
            email: m.email,
            name: m.name,
            phone: m.phone,
            role: "member".to_string(),
            brand_id: m.brand_id,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MemberTokenResponse {
    pub token: String,
    pub user: MemberResponse,
}

#[derive(Clone)]
pub struct MembersState {
    pub members: Repository<Member>,
    pub auth_service: Arc<AuthService>,
    pub password_service: Arc<PasswordService>,
}

impl MembersState {
    async fn ensure_email_free(&self, email: &str) -> Result<()> {
        if self.members.find_one(Filter::new().eq("email", email)).await?.is_some() {
            return Err(PlatformError::duplicate("Member", "email", email));
        }
        Ok(())
    }

    async fn create_member(&self, req: CreateMemberRequest) -> Result<Member> {
        let email = normalize_email(&req.email)?;
        require_text("name", &req.name)?;
        require_text("brand_id", &req.brand_id)?;
        self.ensure_email_free(&email).await?;

        let password_hash = self.password_service.hash_password(&req.password)?;
        let member = Member::new(email, req.name.trim(), req.brand_id, password_hash).with_phone(req.phone);
        self.members.insert(&member).await?;

        info!(member_id = %member.id, brand_id = %member.brand_id, "Member created");
        Ok(member)
    }
}

/// Register as a member
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "members",
    request_body = CreateMemberRequest,
    responses(
        (status = 201, description = "Member registered", body = MemberTokenResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_member(
    State(state): State<MembersState>,
    Json(req): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<MemberTokenResponse>)> {
    let member = state.create_member(req).await?;
    let token = state.auth_service.issue_token(&member.id, &member.email, Role::Member)?;

    Ok((
        StatusCode::CREATED,
        Json(MemberTokenResponse { token, user: member.into() }),
    ))
}

/// Member login
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "members",
    request_body = MemberLoginRequest,
    responses(
        (status = 200, description = "Logged in", body = MemberTokenResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account is inactive")
    )
)]
pub async fn login_member(
    State(state): State<MembersState>,
    Json(req): Json<MemberLoginRequest>,
) -> Result<Json<MemberTokenResponse>> {
    let email = req.email.trim().to_lowercase();

    let member = state
        .members
        .find_one(Filter::new().eq("email", email.as_str()))
        .await?
        .ok_or(PlatformError::InvalidCredentials)?;

    if !state.password_service.verify_password(&req.password, &member.password_hash)? {
        return Err(PlatformError::InvalidCredentials);
    }
    if !member.is_active {
        return Err(PlatformError::AccountInactive);
    }

    let token = state.auth_service.issue_token(&member.id, &member.email, Role::Member)?;
    Ok(Json(MemberTokenResponse { token, user: member.into() }))
}

/// Current member profile
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "members",
    responses(
        (status = 200, description = "Current member", body = MemberResponse),
        (status = 401, description = "Not authenticated or inactive")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(MemberAuth(member): MemberAuth) -> Json<MemberResponse> {
    Json(member.into())
}

/// Update own profile
#[utoipa::path(
    put,
    path = "/api/users/me",
    tag = "members",
    request_body = UpdateMemberRequest,
    responses(
        (status = 200, description = "Profile updated", body = MemberResponse),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_me(
    State(state): State<MembersState>,
    MemberAuth(member): MemberAuth,
    Json(req): Json<UpdateMemberRequest>,
) -> Result<Json<MemberResponse>> {
    let mut fields = doc! { "updated_at": bson::DateTime::from_chrono(Utc::now()) };
    if let Some(name) = req.name {
        require_text("name", &name)?;
        fields.insert("name", name.trim());
    }
    if let Some(phone) = req.phone {
        fields.insert("phone", phone);
    }
    if let Some(email) = req.email {
        let email = normalize_email(&email)?;
        if email != member.email {
            state.ensure_email_free(&email).await?;
            fields.insert("email", email);
        }
    }

    // Only the submitted fields are written; concurrent admin changes
    // such as deactivation survive.
    if !state.members.set_fields(&member.id, fields).await? {
        return Err(PlatformError::not_found("Member", &member.id));
    }
    let updated = state
        .members
        .find_by_id(&member.id)
        .await?
        .ok_or_else(|| PlatformError::not_found("Member", &member.id))?;
    Ok(Json(updated.into()))
}

/// List members (admin)
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "members",
    params(BrandQuery),
    responses((status = 200, description = "Members", body = Vec<MemberResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_members(
    State(state): State<MembersState>,
    _admin: AdminAuth,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<MemberResponse>>> {
    let members = state
        .members
        .find(Filter::new().brand(query.brand()), FindOptions::newest_first(LIST_LIMIT))
        .await?;
    Ok(Json(members.into_iter().map(Into::into).collect()))
}

/// Create a member (admin)
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "members",
    request_body = CreateMemberRequest,
    responses(
        (status = 201, description = "Member created", body = MemberResponse),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_member(
    State(state): State<MembersState>,
    _admin: AdminAuth,
    Json(req): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>)> {
    let member = state.create_member(req).await?;
    Ok((StatusCode::CREATED, Json(member.into())))
}

/// Activate or deactivate a member (admin)
#[utoipa::path(
    put,
    path = "/api/users/{id}/status",
    tag = "members",
    params(("id" = String, Path, description = "Member ID"), MemberStatusQuery),
    responses(
        (status = 200, description = "Status updated", body = MessageResponse),
        (status = 404, description = "Member not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_member_status(
    State(state): State<MembersState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
    Query(query): Query<MemberStatusQuery>,
) -> Result<Json<MessageResponse>> {
    let fields = doc! { "is_active": query.is_active, "updated_at": bson::DateTime::from_chrono(Utc::now()) };
    if !state.members.set_fields(&id, fields).await? {
        return Err(PlatformError::not_found("Member", &id));
    }
    info!(member_id = %id, is_active = query.is_active, "Member status changed");
    Ok(Json(MessageResponse::new("User status updated")))
}

/// Delete a member (admin)
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "members",
    params(("id" = String, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member deleted", body = MessageResponse),
        (status = 404, description = "Member not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_member(
    State(state): State<MembersState>,
    _admin: AdminAuth,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    if !state.members.delete(&id).await? {
        return Err(PlatformError::not_found("Member", &id));
    }
    Ok(Json(MessageResponse::new("User deleted")))
}

pub fn members_router(state: MembersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(register_member))
        .routes(routes!(login_member))
        .routes(routes!(get_me, update_me))
        .routes(routes!(list_members, create_member))
        .routes(routes!(set_member_status))
        .routes(routes!(delete_member))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Argon2Config, AuthConfig, PasswordPolicy};
    use crate::store::{DocumentStore, MemoryStore};

    fn state() -> MembersState {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        MembersState {
            members: Repository::new(store),
            auth_service: Arc::new(AuthService::new(AuthConfig {
                secret_key: "test-secret".to_string(),
                ..Default::default()
            })),
            password_service: Arc::new(
                PasswordService::new(Argon2Config::testing(), PasswordPolicy::default()).unwrap(),
            ),
        }
    }

    #[tokio::test]
    async fn test_profile_update_keeps_concurrent_deactivation() {
        let state = state();
        let member = Member::new("ruth@example.org", "Ruth", "north", "hash");
        state.members.insert(&member).await.unwrap();

        // Admin deactivates after the request loaded its copy of the member
        let stale = member.clone();
        assert!(state
            .members
            .set_fields(&member.id, doc! { "is_active": false })
            .await
            .unwrap());

        let request = UpdateMemberRequest {
            name: Some(" Ruth of Moab ".into()),
            phone: None,
            email: None,
        };
        let Json(response) = update_me(State(state.clone()), MemberAuth(stale), Json(request))
            .await
            .unwrap();
        assert_eq!(response.name, "Ruth of Moab");
        assert!(!response.is_active);

        let stored = state.members.find_by_id(&member.id).await.unwrap().unwrap();
        assert!(!stored.is_active);
        assert_eq!(stored.name, "Ruth of Moab");
    }

    #[tokio::test]
    async fn test_profile_email_change_rejects_taken_address() {
        let state = state();
        let ruth = Member::new("ruth@example.org", "Ruth", "north", "hash");
        let naomi = Member::new("naomi@example.org", "Naomi", "north", "hash");
        state.members.insert(&ruth).await.unwrap();
        state.members.insert(&naomi).await.unwrap();

        let request = UpdateMemberRequest {
            name: None,
            phone: None,
            email: Some("NAOMI@example.org".into()),
        };
        let err = update_me(State(state.clone()), MemberAuth(ruth.clone()), Json(request))
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Duplicate { .. }));

        let stored = state.members.find_by_id(&ruth.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "ruth@example.org");
    }
}
