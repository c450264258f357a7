//! Subscribers API

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

use super::entity::Subscriber;
use crate::shared::api_common::{BrandQuery, LIST_LIMIT};
use crate::shared::error::{PlatformError, Result};
use crate::shared::middleware::AdminAuth;
use crate::shared::validation::{normalize_optional_email, require_text};
use crate::store::{Filter, FindOptions, Repository};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    pub brand_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl SubscribeRequest {
    fn into_subscriber(self) -> Result<Subscriber> {
        require_text("brand_id", &self.brand_id)?;
        let email = normalize_optional_email(self.email.as_deref())?;
        let phone = self.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
        if email.is_none() && phone.is_none() {
            return Err(PlatformError::validation("An email or phone number is required"));
        }

        Ok(Subscriber {
            id: uuid::Uuid::new_v4().to_string(),
            brand_id: self.brand_id,
            email,
            phone,
            created_at: Utc::now(),
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubscriberResponse {
    pub id: String,
    pub brand_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Subscriber> for SubscriberResponse {
    fn from(s: Subscriber) -> Self {
        Self {
            id: s.id,
            brand_id: s.brand_id,
            email: s.email,
            phone: s.phone,
            created_at: s.created_at,
        }
    }
}

#[derive(Clone)]
pub struct SubscribersState {
    pub subscribers: Repository<Subscriber>,
}

/// Subscribe to updates
#[utoipa::path(
    post,
    path = "/api/subscribers",
    tag = "subscribers",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscribed", body = SubscriberResponse),
        (status = 400, description = "Neither email nor phone given, or invalid email")
    )
)]
pub async fn subscribe(
    State(state): State<SubscribersState>,
    Json(req): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<SubscriberResponse>)> {
    let subscriber = req.into_subscriber()?;
    state.subscribers.insert(&subscriber).await?;
    Ok((StatusCode::CREATED, Json(subscriber.into())))
}

/// List subscribers
#[utoipa::path(
    get,
    path = "/api/subscribers",
    tag = "subscribers",
    params(BrandQuery),
    responses((status = 200, description = "Subscribers", body = Vec<SubscriberResponse>)),
    security(("bearer_auth" = []))
)]
pub async fn list_subscribers(
    State(state): State<SubscribersState>,
    _admin: AdminAuth,
    Query(query): Query<BrandQuery>,
) -> Result<Json<Vec<SubscriberResponse>>> {
    let subscribers = state
        .subscribers
        .find(Filter::new().brand(query.brand()), FindOptions::newest_first(LIST_LIMIT))
        .await?;
    Ok(Json(subscribers.into_iter().map(Into::into).collect()))
}

pub fn subscribers_router(state: SubscribersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(subscribe, list_subscribers))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: Option<&str>, phone: Option<&str>) -> SubscribeRequest {
        SubscribeRequest {
            brand_id: "b1".into(),
            email: email.map(String::from),
            phone: phone.map(String::from),
        }
    }

    #[test]
    fn test_requires_a_channel() {
        assert!(request(None, None).into_subscriber().is_err());
        assert!(request(Some(""), Some("  ")).into_subscriber().is_err());
    }

    #[test]
    fn test_phone_only() {
        let subscriber = request(None, Some("555-0100")).into_subscriber().unwrap();
        assert_eq!(subscriber.email, None);
        assert_eq!(subscriber.phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn test_email_is_validated_and_lowercased() {
        assert!(request(Some("not-an-email"), None).into_subscriber().is_err());
        let subscriber = request(Some("Grace@Example.org"), None).into_subscriber().unwrap();
        assert_eq!(subscriber.email.as_deref(), Some("grace@example.org"));
    }
}
