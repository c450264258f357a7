//! Steeple Server
//!
//! Serves the church website backend:
//! - Content APIs: brands, events, ministries, announcements, sermons, ...
//! - Giving APIs: foundations, manual donations, online checkout + webhook
//! - Identity APIs: admin and member authentication
//! - Probes: `/health`, `/ready`
//!
//! ## Configuration
//!
//! Read from `steeple.toml` (or `STEEPLE_CONFIG`), overridden by `STEEPLE_*`
//! environment variables. See `steeple_config::ConfigLoader`.
//! `RUST_LOG` sets the log level.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use utoipa_swagger_ui::SwaggerUi;

use steeple_config::{AppConfig, HttpConfig};
use steeple_platform::auth::{Argon2Config, AuthConfig, AuthService, PasswordPolicy, PasswordService};
use steeple_platform::{DocumentStore, MemoryStore, MongoStore, PlatformServices, StripeCheckout, StripeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    steeple_common::logging::init_logging("steeple-server");

    let config = AppConfig::load()?;
    config.validate()?;
    info!(dev_mode = config.dev_mode, "Starting Steeple Server");

    let store: Arc<dyn DocumentStore> = if config.mongodb.is_memory() {
        warn!("Using the in-memory store; data is lost on restart");
        Arc::new(MemoryStore::new())
    } else {
        info!("Connecting to MongoDB: {}", config.mongodb.database);
        Arc::new(MongoStore::connect(&config.mongodb.uri, &config.mongodb.database).await?)
    };

    let auth_service = Arc::new(AuthService::new(AuthConfig::from_settings(&config.auth)?));
    let password_service = Arc::new(PasswordService::new(
        Argon2Config::default(),
        PasswordPolicy::with_min_length(config.auth.min_password_length),
    )?);
    let checkout = Arc::new(StripeCheckout::new(StripeConfig::from_settings(&config.payments))?);

    let services = PlatformServices {
        store: store.clone(),
        auth_service,
        password_service,
        checkout,
        currency: config.payments.currency.clone(),
    };

    let (api, mut openapi) = services.api();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();

    let app = Router::new()
        .merge(api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", openapi))
        .merge(
            Router::new()
                .route("/health", get(health_handler))
                .route("/ready", get(ready_handler))
                .with_state(store.clone()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.http));

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server drained, closing store");
    store.shutdown().await;
    info!("Steeple Server shutdown complete");
    Ok(())
}

fn cors_layer(http: &HttpConfig) -> CorsLayer {
    let origins = if http.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(http.cors_origins.iter().filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        }))
    };
    CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn ready_handler(
    State(store): State<Arc<dyn DocumentStore>>,
) -> (StatusCode, Json<serde_json::Value>) {
    match store.ping().await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "status": "READY" }))),
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "NOT_READY" })),
            )
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
