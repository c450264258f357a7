//! HTTP API Integration Tests
//!
//! Requests go through the assembled router (auth layer included) backed
//! by the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use steeple_platform::auth::{Argon2Config, AuthConfig, AuthService, PasswordPolicy, PasswordService};
use steeple_platform::payment::{
    CheckoutProvider, CheckoutSession, CheckoutSessionRequest, ProviderPaymentStatus, WebhookOutcome,
};
use steeple_platform::{DocumentStore, MemoryStore, PlatformError, PlatformServices, Result};

struct OfflineProvider;

#[async_trait]
impl CheckoutProvider for OfflineProvider {
    async fn create_session(&self, _request: CheckoutSessionRequest) -> Result<CheckoutSession> {
        Ok(CheckoutSession {
            session_id: "cs_offline".into(),
            url: "https://checkout.test/cs_offline".into(),
        })
    }

    async fn session_status(&self, _session_id: &str) -> Result<ProviderPaymentStatus> {
        Ok(ProviderPaymentStatus::Pending)
    }

    fn verify_webhook(&self, _payload: &[u8], _signature: &str) -> Result<WebhookOutcome> {
        Err(PlatformError::invalid_signature("offline"))
    }
}

fn app() -> Router {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let services = PlatformServices {
        store,
        auth_service: Arc::new(AuthService::new(AuthConfig {
            secret_key: "integration-secret".into(),
            ..AuthConfig::default()
        })),
        password_service: Arc::new(
            PasswordService::new(Argon2Config::testing(), PasswordPolicy::default()).unwrap(),
        ),
        checkout: Arc::new(OfflineProvider),
        currency: "usd".into(),
    };
    services.api().0
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn admin_token(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": "pastor@example.org", "password": "shepherd-123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

fn event(brand_id: &str, title: &str) -> Value {
    json!({
        "brand_id": brand_id,
        "title": title,
        "description": "All welcome",
        "date": "2026-12-24",
        "location": "Sanctuary"
    })
}

mod tenant_tests {
    use super::*;

    #[tokio::test]
    async fn test_brand_filter_isolates_tenants() {
        let app = app();
        let token = admin_token(&app).await;

        for (brand, title) in [("north", "Carols"), ("south", "Picnic")] {
            let (status, _) = send(&app, Method::POST, "/api/events", Some(&token), Some(event(brand, title))).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, north) = send(&app, Method::GET, "/api/events?brand_id=north", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let north = north.as_array().unwrap();
        assert_eq!(north.len(), 1);
        assert_eq!(north[0]["title"], "Carols");

        let (_, all) = send(&app, Method::GET, "/api/events", None, None).await;
        assert_eq!(all.as_array().unwrap().len(), 2);
    }
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_admin_endpoints_require_admin_token() {
        let app = app();

        let (status, body) = send(&app, Method::POST, "/api/events", None, Some(event("north", "Vigil"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");

        let (status, member) = send(
            &app,
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({
                "email": "ruth@example.org",
                "password": "gleaning-1",
                "name": "Ruth",
                "brand_id": "north"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let member_token = member["token"].as_str().unwrap();

        let (status, _) = send(&app, Method::POST, "/api/events", Some(member_token), Some(event("north", "Vigil"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::GET, "/api/events", Some("not-a-token"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_deactivated_member_is_locked_out() {
        let app = app();
        let admin = admin_token(&app).await;

        let credentials = json!({ "email": "Naomi@Example.org", "password": "bethlehem-9" });
        let (_, registered) = send(
            &app,
            Method::POST,
            "/api/users/register",
            None,
            Some(json!({
                "email": "Naomi@Example.org",
                "password": "bethlehem-9",
                "name": "Naomi",
                "brand_id": "north"
            })),
        )
        .await;
        assert_eq!(registered["user"]["email"], "naomi@example.org");
        let member_id = registered["user"]["id"].as_str().unwrap().to_string();
        let member_token = registered["token"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/api/users/{}/status?is_active=false", member_id),
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, Method::POST, "/api/users/login", None, Some(credentials)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, Method::GET, "/api/users/me", Some(&member_token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_claim_email_once() {
        let app = app();
        let admin = admin_token(&app).await;

        let tasks: Vec<_> = (0..4)
            .map(|i| {
                let app = app.clone();
                tokio::spawn(async move {
                    let body = json!({
                        "email": "orpah@example.org",
                        "password": "moabite-77",
                        "name": format!("Orpah {}", i),
                        "brand_id": "north"
                    });
                    send(&app, Method::POST, "/api/users/register", None, Some(body)).await.0
                })
            })
            .collect();

        let mut statuses = Vec::new();
        for task in tasks {
            statuses.push(task.await.unwrap());
        }
        assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1, "{:?}", statuses);
        assert!(statuses
            .iter()
            .all(|s| *s == StatusCode::CREATED || *s == StatusCode::CONFLICT));

        let (_, members) = send(&app, Method::GET, "/api/users", Some(&admin), None).await;
        let claimed = members
            .as_array()
            .unwrap()
            .iter()
            .filter(|m| m["email"] == "orpah@example.org")
            .count();
        assert_eq!(claimed, 1);
    }

    #[tokio::test]
    async fn test_duplicate_admin_email_conflicts() {
        let app = app();
        admin_token(&app).await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "email": "PASTOR@example.org", "password": "another-pass" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}

mod content_tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_urgent_feed_respects_schedule_window() {
        let app = app();
        let token = admin_token(&app).await;
        let now = Utc::now();

        let announcements = [
            ("Boil water notice", true, None, None),
            ("Snow closure", true, Some(now + Duration::days(2)), None),
            ("Parking lot repaving", true, Some(now - Duration::days(1)), Some(now + Duration::days(1))),
            ("Choir practice", false, None, None),
        ];
        for (title, is_urgent, start, end) in announcements {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/announcements",
                Some(&token),
                Some(json!({
                    "brand_id": "north",
                    "title": title,
                    "content": "Details inside",
                    "is_urgent": is_urgent,
                    "scheduled_start": start,
                    "scheduled_end": end
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, urgent) = send(&app, Method::GET, "/api/announcements/urgent?brand_id=north", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let mut titles: Vec<&str> = urgent
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["title"].as_str().unwrap())
            .collect();
        titles.sort();
        assert_eq!(titles, vec!["Boil water notice", "Parking lot repaving"]);
    }

    #[tokio::test]
    async fn test_missing_records_are_not_found() {
        let app = app();
        let token = admin_token(&app).await;

        let sermon = json!({
            "brand_id": "north",
            "title": "Loaves and Fishes",
            "description": "John 6",
            "speaker": "Rev. Hale",
            "date": "2026-10-18",
            "media_type": "video",
            "media_url": "https://video.example.org/loaves"
        });
        let (status, _) = send(&app, Method::PUT, "/api/sermons/missing", Some(&token), Some(sermon)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, "/api/ministries/missing", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::GET, "/api/foundations/missing", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_foundation_gift_over_http() {
        let app = app();
        let token = admin_token(&app).await;

        let (status, fund) = send(
            &app,
            Method::POST,
            "/api/foundations",
            Some(&token),
            Some(json!({
                "brand_id": "north",
                "title": "Food Pantry",
                "description": "Winter stock",
                "image_url": "",
                "goal_amount": 500
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let fund_id = fund["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/foundations/donate",
            None,
            Some(json!({
                "foundation_id": fund_id,
                "donor_name": "Boaz",
                "donor_email": "boaz@example.org",
                "amount": 75.5
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, fund) = send(&app, Method::GET, &format!("/api/foundations/{}", fund_id), None, None).await;
        assert_eq!(fund["raised_amount"].as_f64(), Some(75.5));

        let (status, _) = send(&app, Method::GET, &format!("/api/foundations/{}/donations", fund_id), None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
