//! In-memory Riot session.
//!
//! One `Session` per process, held in [`AppState`](crate::state::AppState).
//! Tokens are replaced wholesale on each successful login and read before
//! every authorized call. There is no expiry or refresh handling.

use dsf_core::{AuthTokens, TokenError};
use tokio::sync::RwLock;

/// Holder of the current user's tokens.
#[derive(Debug, Default)]
pub struct Session {
    tokens: RwLock<Option<AuthTokens>>,
}

impl Session {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse tokens from a redirect URL and store them.
    ///
    /// The URL is parsed completely before the session is touched, so a
    /// failure leaves any previous tokens in place.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] with a human-readable reason if the URL does
    /// not carry both tokens.
    pub async fn extract_tokens_from_url(&self, url: &str) -> Result<(), TokenError> {
        let tokens = AuthTokens::from_redirect_url(url).inspect_err(|e| {
            tracing::warn!(error = %e, "Token extraction failed");
        })?;

        *self.tokens.write().await = Some(tokens);
        tracing::info!("Riot session tokens stored");
        Ok(())
    }

    /// Snapshot of the current tokens, if logged in.
    pub async fn tokens(&self) -> Option<AuthTokens> {
        self.tokens.read().await.clone()
    }
}
