//! Login API.
//!
//! The web variant takes a pasted redirect URL. The desktop variant drives
//! [`LoginFlow`](crate::login::LoginFlow) for a window host.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{Result, add_breadcrumb};
use crate::extract::ApiJson;
use crate::login::LoginState;
use crate::state::AppState;

/// Request body carrying a redirect or navigation URL.
#[derive(Deserialize)]
pub struct UrlRequest {
    pub url: String,
    /// Attempt the navigation belongs to; the current attempt when absent.
    #[serde(default)]
    pub attempt: Option<Uuid>,
}

/// Response body for a successful web login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
}

/// `POST /api/login` - extract tokens from a pasted redirect URL.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UrlRequest>,
) -> Result<Json<LoginResponse>> {
    state.session().extract_tokens_from_url(&request.url).await?;
    add_breadcrumb("auth", "Logged in with pasted redirect URL");
    Ok(Json(LoginResponse {
        message: "Login successful",
    }))
}

/// `POST /api/login/start` - open the login window and start polling.
#[instrument(skip_all)]
pub async fn start(State(state): State<AppState>) -> StatusCode {
    let attempt = state.login().start();
    add_breadcrumb("auth", &format!("Login attempt {attempt} started"));
    StatusCode::ACCEPTED
}

/// `POST /api/login/navigate` - the window host reports a new location.
// The URL may carry tokens, so it is never logged.
#[instrument(skip_all)]
pub async fn navigate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UrlRequest>,
) -> Result<StatusCode> {
    state
        .login()
        .report_navigation(request.attempt, &request.url)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/login/cancel` - abort the attempt in flight, if any.
#[instrument(skip_all)]
pub async fn cancel(State(state): State<AppState>) -> StatusCode {
    state.login().cancel();
    StatusCode::NO_CONTENT
}

/// `GET /api/login/status`
pub async fn status(State(state): State<AppState>) -> Json<LoginState> {
    Json(state.login().state())
}
