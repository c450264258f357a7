//! API Middleware
//!
//! Bearer-token authentication for Axum. [`AuthLayer`] puts [`AuthState`]
//! into request extensions; the extractors below read it back, so handlers
//! only declare the principal they need:
//!
//! - [`AdminAuth`]: admin token whose admin record still exists
//! - [`MemberAuth`]: member token whose member record exists and is active
//! - [`OptionalMember`]: like `MemberAuth` but never rejects

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::admin::entity::Admin;
use crate::auth::{extract_bearer_token, AuthService, Role, TokenClaims};
use crate::member::entity::Member;
use crate::shared::error::PlatformError;
use crate::store::Repository;

/// Shared state consulted by the auth extractors
#[derive(Clone)]
pub struct AuthState {
    pub auth_service: Arc<AuthService>,
    pub admins: Repository<Admin>,
    pub members: Repository<Member>,
}

fn auth_state(parts: &Parts) -> Result<&AuthState, PlatformError> {
    parts
        .extensions
        .get::<AuthState>()
        .ok_or_else(|| PlatformError::internal("Auth service not configured"))
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_bearer_token)
}

fn claims_for(parts: &Parts, state: &AuthState, role: Role) -> Result<TokenClaims, PlatformError> {
    let token = bearer_token(parts)
        .ok_or_else(|| PlatformError::unauthorized("Missing authentication token"))?;
    let claims = state.auth_service.validate_token(token)?;
    if claims.role != role {
        return Err(PlatformError::unauthorized("Token is not valid for this endpoint"));
    }
    Ok(claims)
}

async fn resolve_member(state: &AuthState, claims: &TokenClaims) -> Result<Member, PlatformError> {
    match state.members.find_by_id(&claims.sub).await? {
        Some(member) if member.is_active => Ok(member),
        _ => Err(PlatformError::unauthorized("User not found or inactive")),
    }
}

/// Authenticated admin
pub struct AdminAuth(pub Admin);

impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = auth_state(parts)?;
        let claims = claims_for(parts, state, Role::Admin)?;

        let admin = state
            .admins
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| PlatformError::unauthorized("Admin not found"))?;

        Ok(AdminAuth(admin))
    }
}

/// Authenticated, active member
pub struct MemberAuth(pub Member);

impl<S> FromRequestParts<S> for MemberAuth
where
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = auth_state(parts)?;
        let claims = claims_for(parts, state, Role::Member)?;
        Ok(MemberAuth(resolve_member(state, &claims).await?))
    }
}

/// Member identity when a valid member token is present, `None` otherwise
pub struct OptionalMember(pub Option<Member>);

impl<S> FromRequestParts<S> for OptionalMember
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Ok(state) = auth_state(parts) else {
            return Ok(OptionalMember(None));
        };
        let Ok(claims) = claims_for(parts, state, Role::Member) else {
            return Ok(OptionalMember(None));
        };
        Ok(OptionalMember(resolve_member(state, &claims).await.ok()))
    }
}

/// Injects [`AuthState`] into request extensions
#[derive(Clone)]
pub struct AuthLayer {
    state: AuthState,
}

impl AuthLayer {
    pub fn new(state: AuthState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    state: AuthState,
}

impl<S, B> Service<axum::http::Request<B>> for AuthMiddleware<S>
where
    S: Service<axum::http::Request<B>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(self.state.clone());
        Box::pin(self.inner.call(req))
    }
}
