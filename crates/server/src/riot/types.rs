//! Wire types for the Riot endpoints used ahead of the storefront fetch.

use serde::{Deserialize, Serialize};

/// Response from the entitlements token endpoint.
#[derive(Debug, Deserialize)]
pub struct EntitlementsResponse {
    pub entitlements_token: Option<String>,
}

/// Subset of the `OpenID` userinfo response.
#[derive(Debug, Deserialize)]
pub struct UserInfo {
    /// Player UUID.
    pub sub: Option<String>,
}

/// Request body for the region lookup.
#[derive(Debug, Serialize)]
pub struct RegionRequest<'a> {
    pub id_token: &'a str,
}

/// Response from the region lookup.
#[derive(Debug, Deserialize)]
pub struct RegionResponse {
    #[serde(default)]
    pub affinities: Affinities,
}

/// Region affinities keyed by environment.
#[derive(Debug, Default, Deserialize)]
pub struct Affinities {
    pub live: Option<String>,
}

/// Response from the valorant-api.com version endpoint.
#[derive(Debug, Deserialize)]
pub struct VersionResponse {
    pub data: Option<VersionData>,
}

#[derive(Debug, Deserialize)]
pub struct VersionData {
    #[serde(rename = "riotClientVersion")]
    pub riot_client_version: Option<String>,
}
