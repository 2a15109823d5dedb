//! Request extractors whose rejections use the API error body.

use axum::extract::FromRequest;

use crate::error::AppError;

/// [`axum::Json`] that rejects with [`AppError::BadRequest`].
///
/// A missing content type, invalid JSON or a missing field all answer
/// `400 {"detail": "<reason>"}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
