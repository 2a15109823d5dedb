//! Riot identity tokens delivered through the implicit-grant redirect.
//!
//! After login, the Riot identity provider redirects to
//! `https://playvalorant.com/opt_in#access_token=...&id_token=...`. The
//! tokens are carried in the URL fragment; some browsers and copy/paste paths
//! turn that into a query string, so both are accepted.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Substring that marks a redirect URL as carrying an access token.
pub const ACCESS_TOKEN_MARKER: &str = "access_token=";

/// Pre-encoded query for the Riot authorize endpoint.
const AUTHORIZE_QUERY: &str = "redirect_uri=https%3A%2F%2Fplayvalorant.com%2Fopt_in&\
    client_id=play-valorant-web-prod&\
    response_type=token%20id_token&\
    nonce=1&\
    scope=account%20openid";

/// Errors that can occur when extracting tokens from a redirect URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The input is not a parseable absolute URL.
    #[error("invalid redirect URL: {0}")]
    InvalidUrl(String),
    /// Neither fragment nor query carries an `access_token`.
    #[error("no access token found in URL")]
    MissingAccessToken,
    /// An access token is present but the `id_token` is not.
    #[error("no ID token found in URL")]
    MissingIdToken,
}

/// Access and ID tokens for the current Riot session.
///
/// Both values are secrets; `Debug` output is redacted by [`SecretString`].
#[derive(Debug, Clone)]
pub struct AuthTokens {
    access_token: SecretString,
    id_token: SecretString,
}

impl AuthTokens {
    /// Create a token pair from raw values.
    #[must_use]
    pub fn new(access_token: impl Into<String>, id_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            id_token: SecretString::from(id_token.into()),
        }
    }

    /// Parse the token pair out of a redirect URL.
    ///
    /// The fragment is searched first, then the query string. Empty values
    /// count as missing.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError`] if the URL does not parse or either token is
    /// absent.
    pub fn from_redirect_url(input: &str) -> Result<Self, TokenError> {
        let url = Url::parse(input.trim()).map_err(|e| TokenError::InvalidUrl(e.to_string()))?;

        let mut access_token = None;
        let mut id_token = None;

        for source in [url.fragment(), url.query()].into_iter().flatten() {
            for (key, value) in url::form_urlencoded::parse(source.as_bytes()) {
                if value.is_empty() {
                    continue;
                }
                match key.as_ref() {
                    "access_token" if access_token.is_none() => {
                        access_token = Some(value.into_owned());
                    }
                    "id_token" if id_token.is_none() => id_token = Some(value.into_owned()),
                    _ => {}
                }
            }
        }

        let access_token = access_token.ok_or(TokenError::MissingAccessToken)?;
        let id_token = id_token.ok_or(TokenError::MissingIdToken)?;

        Ok(Self::new(access_token, id_token))
    }

    /// The bearer token for Riot API calls.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// The `OpenID` Connect ID token (used for the region lookup).
    #[must_use]
    pub fn id_token(&self) -> &str {
        self.id_token.expose_secret()
    }
}

/// Whether a navigated URL looks like the post-login redirect.
#[must_use]
pub fn has_access_token(url: &str) -> bool {
    url.contains(ACCESS_TOKEN_MARKER)
}

/// Build the Riot authorize URL that starts the implicit-grant login.
///
/// # Arguments
///
/// * `auth_base` - Identity provider origin, e.g. `https://auth.riotgames.com`
#[must_use]
pub fn authorize_url(auth_base: &str) -> String {
    format!(
        "{}/authorize?{AUTHORIZE_QUERY}",
        auth_base.trim_end_matches('/')
    )
}
