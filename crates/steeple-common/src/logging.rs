//! Structured Logging
//!
//! Two output modes, picked by `LOG_FORMAT`:
//! - `json`: one JSON object per event, span fields flattened in (log shipping)
//! - anything else: compact human-readable lines (local development)
//!
//! Level filtering follows `RUST_LOG` and defaults to `info`, e.g.
//! `RUST_LOG=steeple_platform=debug,tower_http=info`.
//!
//! ```rust,ignore
//! steeple_common::logging::init_logging("steeple-server");
//! tracing::info!(foundation_id = %id, "Donation recorded");
//! ```

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. Must be called once, before any logging.
pub fn init_logging(service_name: &str) {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        init_json_logging(build_filter());
    } else {
        init_text_logging(build_filter());
    }

    tracing::info!(service = service_name, json, "Logging initialized");
}

/// Same as [`init_logging`] with the default service name.
pub fn init_default_logging() {
    init_logging("steeple");
}

fn build_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn init_json_logging(env_filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_target(true)
                .flatten_event(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .init();
}

fn init_text_logging(env_filter: EnvFilter) {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(true),
        )
        .init();
}
