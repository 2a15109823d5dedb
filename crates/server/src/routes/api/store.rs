//! Storefront API.

use axum::{Json, extract::State};
use dsf_core::{DisplayItem, compose_display_items};
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Response body for `GET /api/store`.
#[derive(Debug, Serialize)]
pub struct StoreResponse {
    pub items: Vec<DisplayItem>,
}

/// Fetch and compose today's offers.
///
/// Fails with 401 before any upstream call when no one is logged in.
#[instrument(skip(state))]
pub async fn get_store(State(state): State<AppState>) -> Result<Json<StoreResponse>> {
    let tokens = state
        .session()
        .tokens()
        .await
        .ok_or(AppError::Unauthorized)?;

    let store = state.riot().get_storefront(&tokens).await?;
    let items = compose_display_items(&store, state.assets());
    tracing::info!(items = items.len(), "Storefront composed");

    Ok(Json(StoreResponse { items }))
}
