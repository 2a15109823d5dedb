//! Riot API client implementation.

use std::sync::Arc;

use dsf_core::{AuthTokens, Storefront};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::RiotError;
use super::types::{EntitlementsResponse, RegionRequest, RegionResponse, UserInfo, VersionResponse};
use crate::config::RiotConfig;

/// Base64 of the PC client platform descriptor Riot expects on PD calls.
pub const CLIENT_PLATFORM: &str = "ew0KCSJwbGF0Zm9ybVR5cGUiOiAiUEMiLA0KCSJwbGF0Zm9ybU9TIjogIldpbmRvd3MiLA0KCSJwbGF0Zm9ybU9TVmVyc2lvbiI6ICIxMC4wLjE5MDQyLjEuMjU2LjY0Yml0IiwNCgkicGxhdGZvcm1DaGlwc2V0IjogIlVua25vd24iDQp9";

const ENTITLEMENTS_HEADER: &str = "X-Riot-Entitlements-JWT";
const CLIENT_PLATFORM_HEADER: &str = "X-Riot-ClientPlatform";
const CLIENT_VERSION_HEADER: &str = "X-Riot-ClientVersion";

/// Shard used when the region lookup returns no live affinity.
const DEFAULT_SHARD: &str = "na";

/// Map a region affinity to the PD shard that serves it.
///
/// LATAM and BR players are served from the NA shard.
#[must_use]
pub fn shard_for_region(region: &str) -> &str {
    match region {
        "latam" | "br" => "na",
        other => other,
    }
}

// =============================================================================
// RiotClient
// =============================================================================

/// Client for the Riot identity and commerce APIs.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct RiotClient {
    inner: Arc<RiotClientInner>,
}

struct RiotClientInner {
    client: reqwest::Client,
    config: RiotConfig,
}

impl RiotClient {
    /// Create a new Riot API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// initialization).
    pub fn new(config: &RiotConfig) -> Result<Self, RiotError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(RiotClientInner {
                client: builder.build()?,
                config: config.clone(),
            }),
        })
    }

    /// Fetch the current storefront for the session's player.
    ///
    /// # Errors
    ///
    /// Returns an error if any step of the request chain fails. The variant
    /// records which step and why.
    #[instrument(skip_all)]
    pub async fn get_storefront(&self, tokens: &AuthTokens) -> Result<Storefront, RiotError> {
        let entitlements = self.entitlements_token(tokens).await?;
        let puuid = self.player_uuid(tokens).await?;
        let shard = self.shard(tokens).await?;
        let version = self.client_version().await?;

        let url = format!("{}/store/v2/storefront/{puuid}", self.pd_base(&shard));
        debug!(%shard, "Fetching storefront");

        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(tokens.access_token())
            .header(ENTITLEMENTS_HEADER, entitlements)
            .header(CLIENT_PLATFORM_HEADER, CLIENT_PLATFORM)
            .header(CLIENT_VERSION_HEADER, version)
            .send()
            .await?;

        read_json(response, "storefront").await
    }

    /// Exchange the access token for an entitlements JWT.
    async fn entitlements_token(&self, tokens: &AuthTokens) -> Result<String, RiotError> {
        let url = format!(
            "{}/api/token/v1",
            self.inner.config.entitlements_url.trim_end_matches('/')
        );

        let response = self
            .inner
            .client
            .post(&url)
            .bearer_auth(tokens.access_token())
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let body: EntitlementsResponse = read_json(response, "entitlements").await?;
        body.entitlements_token
            .filter(|t| !t.is_empty())
            .ok_or(RiotError::MissingField {
                endpoint: "entitlements",
                field: "entitlements_token",
            })
    }

    /// Resolve the player UUID from the userinfo endpoint.
    async fn player_uuid(&self, tokens: &AuthTokens) -> Result<String, RiotError> {
        let url = format!(
            "{}/userinfo",
            self.inner.config.auth_url.trim_end_matches('/')
        );

        let response = self
            .inner
            .client
            .get(&url)
            .bearer_auth(tokens.access_token())
            .send()
            .await?;

        let body: UserInfo = read_json(response, "userinfo").await?;
        body.sub
            .filter(|s| !s.is_empty())
            .ok_or(RiotError::MissingField {
                endpoint: "userinfo",
                field: "sub",
            })
    }

    /// Resolve the player's shard from the region lookup.
    async fn shard(&self, tokens: &AuthTokens) -> Result<String, RiotError> {
        let url = format!(
            "{}/pas/v1/product/valorant",
            self.inner.config.geo_url.trim_end_matches('/')
        );

        let response = self
            .inner
            .client
            .put(&url)
            .bearer_auth(tokens.access_token())
            .json(&RegionRequest {
                id_token: tokens.id_token(),
            })
            .send()
            .await?;

        let body: RegionResponse = read_json(response, "region").await?;
        let region = body.affinities.live.unwrap_or_else(|| {
            debug!("Region lookup returned no live affinity, using default shard");
            DEFAULT_SHARD.to_string()
        });

        Ok(shard_for_region(&region).to_string())
    }

    /// The pinned client version, or the current one from the version endpoint.
    async fn client_version(&self) -> Result<String, RiotError> {
        if let Some(version) = &self.inner.config.client_version {
            return Ok(version.clone());
        }

        let response = self
            .inner
            .client
            .get(&self.inner.config.version_url)
            .send()
            .await?;

        let body: VersionResponse = read_json(response, "version").await?;
        body.data
            .and_then(|d| d.riot_client_version)
            .ok_or(RiotError::MissingField {
                endpoint: "version",
                field: "riotClientVersion",
            })
    }

    /// Storefront origin for a shard, unless overridden.
    fn pd_base(&self, shard: &str) -> String {
        self.inner.config.pd_url.as_ref().map_or_else(
            || format!("https://pd.{shard}.a.pvp.net"),
            |url| url.trim_end_matches('/').to_string(),
        )
    }
}

/// Check the status and decode a JSON body, logging what went wrong.
async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &'static str,
) -> Result<T, RiotError> {
    let status = response.status();

    // Get response body as text first for better error diagnostics
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(
            endpoint,
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Riot API returned non-success status"
        );
        return Err(RiotError::Status {
            endpoint,
            status: status.as_u16(),
        });
    }

    serde_json::from_str(&body).map_err(|source| {
        tracing::error!(
            endpoint,
            error = %source,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse Riot API response"
        );
        RiotError::Parse { endpoint, source }
    })
}
