//! Riot identity and commerce API client.
//!
//! # Architecture
//!
//! - Plain `reqwest` JSON calls, one client shared by every request
//! - Riot is source of truth - the storefront is fetched fresh on every call
//! - Tokens come from the in-memory session; nothing is persisted
//!
//! # Request chain
//!
//! The commerce endpoint needs more than the access token, so a storefront
//! fetch is a short chain:
//!
//! 1. Entitlements JWT (`POST /api/token/v1`)
//! 2. Player UUID (`GET /userinfo`)
//! 3. Shard (`PUT /pas/v1/product/valorant` with the ID token)
//! 4. Client version (pinned in config or looked up)
//! 5. Storefront (`GET /store/v2/storefront/{puuid}`)
//!
//! # Example
//!
//! ```rust,ignore
//! use dsf_server::riot::RiotClient;
//!
//! let client = RiotClient::new(&config.riot)?;
//! let store = client.get_storefront(&tokens).await?;
//! ```

mod client;
pub mod types;

pub use client::{CLIENT_PLATFORM, RiotClient, shard_for_region};

use thiserror::Error;

/// Errors that can occur when talking to Riot APIs.
#[derive(Debug, Error)]
pub enum RiotError {
    /// HTTP request failed (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An endpoint answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        /// Which step of the chain failed.
        endpoint: &'static str,
        /// HTTP status code.
        status: u16,
    },

    /// Response body was not the expected JSON.
    #[error("{endpoint} returned malformed JSON: {source}")]
    Parse {
        /// Which step of the chain failed.
        endpoint: &'static str,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// Response parsed but lacked a required value.
    #[error("{endpoint} response missing {field}")]
    MissingField {
        /// Which step of the chain failed.
        endpoint: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = RiotError::Status {
            endpoint: "storefront",
            status: 403,
        };
        assert_eq!(err.to_string(), "storefront returned HTTP 403");
    }

    #[test]
    fn test_missing_field_display() {
        let err = RiotError::MissingField {
            endpoint: "userinfo",
            field: "sub",
        };
        assert_eq!(err.to_string(), "userinfo response missing sub");
    }

    #[test]
    fn test_parse_error_display() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = RiotError::Parse {
            endpoint: "entitlements",
            source,
        };
        assert!(err.to_string().starts_with("entitlements returned malformed JSON"));
    }
}
