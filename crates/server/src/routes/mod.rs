//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page
//! GET  /health                 - Health check
//! GET  /static/*               - Static assets
//!
//! # Store
//! GET  /api/store              - Today's offers for the logged-in player
//!
//! # Web login
//! POST /api/login              - Paste the redirect URL
//!
//! # Desktop login
//! POST /api/login/start        - Open the login window and start polling
//! POST /api/login/navigate     - Window host reports a navigation
//! POST /api/login/cancel       - Abort the attempt in flight
//! GET  /api/login/status       - Idle, awaiting or last outcome
//! GET  /api/events             - SSE stream of shell events
//! ```

pub mod api;
pub mod home;

use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::Variant;
use crate::middleware::security_headers_middleware;
use crate::state::AppState;

/// Correlation header, kept from the window host or proxy when present.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn request_id(request: &axum::extract::Request) -> &str {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// Create the web-variant login routes router.
pub fn web_login_routes() -> Router<AppState> {
    Router::new().route("/api/login", post(api::login::login))
}

/// Create the desktop-variant login routes router.
pub fn desktop_login_routes() -> Router<AppState> {
    Router::new()
        .route("/api/login/start", post(api::login::start))
        .route("/api/login/navigate", post(api::login::navigate))
        .route("/api/login/cancel", post(api::login::cancel))
        .route("/api/login/status", get(api::login::status))
        .route("/api/events", get(api::events::events))
}

/// Create all routes for the given variant.
pub fn routes(variant: Variant) -> Router<AppState> {
    let router = Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .route("/api/store", get(api::store::get_store));

    match variant {
        Variant::Web => router.merge(web_login_routes()),
        Variant::Desktop => router.merge(desktop_login_routes()),
    }
}

/// Build the complete application router with static files and middleware.
///
/// Sentry layers are added by the binary.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config().static_dir.clone();

    routes(state.config().variant)
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::extract::Request| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = request_id(request),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_request(|request: &axum::extract::Request, _span: &Span| {
                    let id = request_id(request);
                    sentry::configure_scope(|scope| scope.set_tag("request_id", id));
                })
                .on_response(
                    |response: &axum::response::Response, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
