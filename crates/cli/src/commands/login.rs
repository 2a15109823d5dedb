//! Login helpers for the paste-URL flow.

use dsf_core::AuthTokens;

use super::config;

/// Print the Riot authorize URL.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn login_url() -> Result<(), Box<dyn std::error::Error>> {
    let config = config()?;
    tracing::info!("Sign in here, then copy the URL you land on:");
    tracing::info!("  {}", config.riot.authorize_url());
    Ok(())
}

/// Check that `url` carries both tokens without printing them.
///
/// # Errors
///
/// Returns the extraction failure reason.
pub fn check_url(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    AuthTokens::from_redirect_url(url)?;
    tracing::info!("Redirect URL carries an access token and an ID token");
    Ok(())
}
