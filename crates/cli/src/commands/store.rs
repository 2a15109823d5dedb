//! One-shot storefront fetch.

use dsf_core::{AuthTokens, compose_display_items};
use dsf_server::riot::RiotClient;
use dsf_server::services::AssetCatalog;

use super::config;

/// Log in with `redirect_url`, fetch the store and print the display items.
///
/// # Errors
///
/// Returns an error if the URL has no tokens or any Riot call fails.
pub async fn fetch(redirect_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = config()?;
    let tokens = AuthTokens::from_redirect_url(redirect_url)?;

    let assets = AssetCatalog::load(&config.assets).await;
    let client = RiotClient::new(&config.riot)?;

    tracing::info!("Fetching storefront...");
    let store = client.get_storefront(&tokens).await?;
    let items = compose_display_items(&store, &assets);

    tracing::info!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "items": items }))?
    );
    Ok(())
}
