//! Skin catalog commands.

use std::path::Path;

use dsf_core::SkinResolver;
use dsf_server::config::DEFAULT_ASSET_CATALOG_URL;
use dsf_server::services::AssetCatalog;
use thiserror::Error;

use super::config;

/// Errors specific to catalog export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The downloaded document had no skin levels.
    #[error("remote catalog at {0} is empty, refusing to overwrite")]
    Empty(String),
}

/// Print the catalog entry for `uuid`, or the fallback.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub async fn lookup(uuid: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = config()?;
    let catalog = AssetCatalog::load(&config.assets).await;

    let info = catalog.get_skin_data(uuid);
    tracing::info!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

/// Download the remote catalog to `output`.
///
/// # Errors
///
/// Returns an error if the download fails, the catalog is empty, or the file
/// cannot be written.
pub async fn export(output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = config()?;
    let url = config
        .assets
        .remote_url
        .unwrap_or_else(|| DEFAULT_ASSET_CATALOG_URL.to_string());

    tracing::info!(%url, "Downloading skin catalog...");
    let document = AssetCatalog::fetch_document(&reqwest::Client::new(), &url).await?;
    if document.data.is_empty() {
        return Err(ExportError::Empty(url).into());
    }

    let skins = document.data.len();
    AssetCatalog::save_document(&document, output).await?;

    tracing::info!(skins, path = %output.display(), "Skin catalog written");
    Ok(())
}
