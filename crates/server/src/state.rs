//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::DsfConfig;
use crate::login::{EventHub, LoginFlow, PollSettings};
use crate::riot::{RiotClient, RiotError};
use crate::services::{AssetCatalog, Session};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// session, the Riot client and the skin catalog.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: DsfConfig,
    session: Arc<Session>,
    riot: RiotClient,
    assets: AssetCatalog,
    login: LoginFlow,
}

impl AppState {
    /// Create a new application state with the default polling budget.
    ///
    /// # Errors
    ///
    /// Returns an error if the Riot HTTP client cannot be built.
    pub fn new(config: DsfConfig, assets: AssetCatalog) -> Result<Self, RiotError> {
        Self::with_poll_settings(config, assets, PollSettings::default())
    }

    /// Create a new application state with a custom polling budget.
    ///
    /// # Errors
    ///
    /// Returns an error if the Riot HTTP client cannot be built.
    pub fn with_poll_settings(
        config: DsfConfig,
        assets: AssetCatalog,
        settings: PollSettings,
    ) -> Result<Self, RiotError> {
        let riot = RiotClient::new(&config.riot)?;
        let session = Arc::new(Session::new());
        let login = LoginFlow::new(
            Arc::clone(&session),
            EventHub::new(),
            config.riot.authorize_url(),
            settings,
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                session,
                riot,
                assets,
                login,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &DsfConfig {
        &self.inner.config
    }

    /// Get a reference to the in-memory Riot session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Get a reference to the Riot API client.
    #[must_use]
    pub fn riot(&self) -> &RiotClient {
        &self.inner.riot
    }

    /// Get a reference to the skin catalog.
    #[must_use]
    pub fn assets(&self) -> &AssetCatalog {
        &self.inner.assets
    }

    /// Get a reference to the desktop login coordinator.
    #[must_use]
    pub fn login(&self) -> &LoginFlow {
        &self.inner.login
    }
}
