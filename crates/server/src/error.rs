//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Error bodies are JSON: `{"detail": "<reason>"}`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dsf_core::TokenError;
use serde::Serialize;
use thiserror::Error;

use crate::login::NoActiveAttempt;
use crate::riot::RiotError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// No tokens in the session.
    #[error("Not authenticated")]
    Unauthorized,

    /// The pasted or reported redirect URL did not carry usable tokens.
    #[error("Login failed: {0}")]
    Login(#[from] TokenError),

    /// Riot API chain failed.
    #[error("Riot error: {0}")]
    Riot(#[from] RiotError),

    /// Request conflicts with the current login state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request body missing, not JSON, or the wrong shape.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<NoActiveAttempt> for AppError {
    fn from(err: NoActiveAttempt) -> Self {
        Self::Conflict(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized | Self::Login(_) => StatusCode::UNAUTHORIZED,
            Self::Riot(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Server errors are not described.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Unauthorized => "Not authenticated".to_string(),
            Self::Login(err) => err.to_string(),
            Self::Riot(_) => "Failed to fetch store".to_string(),
            Self::Conflict(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture upstream failures to Sentry
        if matches!(self, Self::Riot(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            detail: self.detail(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}
