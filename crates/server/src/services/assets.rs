//! Skin catalog used to resolve offer identifiers to names and icons.
//!
//! The catalog is loaded once at startup from the valorant-api.com skin level
//! list, falling back to the bundled copy, falling back to an empty catalog.
//! A successful remote load refreshes the bundled copy, so the next offline
//! start sees the latest catalog. Lookups never fail: unknown identifiers
//! resolve to a placeholder item.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use dsf_core::{SkinInfo, SkinResolver};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AssetCatalogConfig;

/// Name shown for identifiers missing from the catalog.
pub const UNKNOWN_ITEM_NAME: &str = "Unknown Item";
/// Icon shown for identifiers missing from the catalog.
pub const UNKNOWN_ITEM_ICON: &str = "/static/img/unknown.svg";

/// Errors that can occur while loading a catalog.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to fetch catalog: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog endpoint returned HTTP {0}")]
    Status(u16),
}

/// Catalog document, in the valorant-api.com response shape.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub data: Vec<SkinLevel>,
}

/// One skin level entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinLevel {
    pub uuid: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "displayIcon", default)]
    pub display_icon: Option<String>,
}

/// Read-only map from skin level UUID to display metadata.
///
/// Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    skins: Arc<HashMap<String, SkinInfo>>,
}

impl AssetCatalog {
    /// Build a catalog from skin level entries.
    ///
    /// Keys are lowercased; Riot and valorant-api.com disagree on case.
    #[must_use]
    pub fn from_levels(levels: impl IntoIterator<Item = SkinLevel>) -> Self {
        let skins = levels
            .into_iter()
            .map(|level| {
                let info = SkinInfo {
                    name: level.display_name,
                    icon: level
                        .display_icon
                        .unwrap_or_else(|| UNKNOWN_ITEM_ICON.to_string()),
                };
                (level.uuid.to_ascii_lowercase(), info)
            })
            .collect();

        Self {
            skins: Arc::new(skins),
        }
    }

    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a catalog document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, AssetError> {
        let document: CatalogDocument = serde_json::from_slice(bytes)?;
        Ok(Self::from_levels(document.data))
    }

    /// Load the bundled catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }

    /// Fetch the catalog document from a remote endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a
    /// malformed body.
    pub async fn fetch_document(
        client: &reqwest::Client,
        url: &str,
    ) -> Result<CatalogDocument, AssetError> {
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write `document` to `path` as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized or written.
    pub async fn save_document(
        document: &CatalogDocument,
        path: &Path,
    ) -> Result<(), AssetError> {
        let json = serde_json::to_vec_pretty(document)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Load the catalog: remote first, then bundled, then empty.
    pub async fn load(config: &AssetCatalogConfig) -> Self {
        if let Some(url) = &config.remote_url {
            match Self::fetch_document(&reqwest::Client::new(), url).await {
                Ok(document) if !document.data.is_empty() => {
                    if let Err(e) = Self::save_document(&document, &config.bundled_path).await {
                        tracing::warn!(
                            error = %e,
                            path = %config.bundled_path.display(),
                            "Could not refresh bundled skin catalog"
                        );
                    }
                    let catalog = Self::from_levels(document.data);
                    tracing::info!(skins = catalog.len(), %url, "Loaded remote skin catalog");
                    return catalog;
                }
                Ok(_) => {
                    tracing::warn!(%url, "Remote skin catalog is empty, using bundled copy");
                }
                Err(e) => {
                    tracing::warn!(error = %e, %url, "Remote skin catalog unavailable, using bundled copy");
                }
            }
        }

        match Self::from_file(&config.bundled_path) {
            Ok(catalog) => {
                tracing::info!(
                    skins = catalog.len(),
                    path = %config.bundled_path.display(),
                    "Loaded bundled skin catalog"
                );
                catalog
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %config.bundled_path.display(),
                    "Bundled skin catalog unavailable, every item will show as unknown"
                );
                Self::default()
            }
        }
    }

    /// Number of skins in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.skins.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skins.is_empty()
    }
}

impl SkinResolver for AssetCatalog {
    fn get_skin_data(&self, uuid: &str) -> SkinInfo {
        self.skins
            .get(&uuid.to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| SkinInfo {
                name: UNKNOWN_ITEM_NAME.to_string(),
                icon: UNKNOWN_ITEM_ICON.to_string(),
            })
    }
}
