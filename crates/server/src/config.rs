//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Host
//! - `DSF_VARIANT` - `web` (default) or `desktop`
//! - `DSF_HOST` - Bind address (default: `0.0.0.0` for web, `127.0.0.1` for desktop)
//! - `DSF_PORT` - Listen port (default: 8000 for web, 23456 for desktop)
//! - `DSF_TLS_CERT_PATH` - PEM certificate chain (default: `cert.pem`, web only)
//! - `DSF_TLS_KEY_PATH` - PEM private key (default: `key.pem`, web only)
//! - `DSF_STATIC_DIR` - Static asset directory (default: `crates/server/static`)
//! - `DSF_LOG_JSON` - Emit JSON logs when set to `1`/`true`
//!
//! ## Asset catalog
//! - `DSF_ASSET_CATALOG_PATH` - Bundled skin catalog (default: `crates/server/assets/skins.json`)
//! - `DSF_ASSET_CATALOG_URL` - Remote skin catalog (default: valorant-api.com skin levels; empty disables)
//!
//! ## Riot endpoints
//! - `RIOT_AUTH_URL` - Identity provider (default: `https://auth.riotgames.com`)
//! - `RIOT_ENTITLEMENTS_URL` - Entitlements service
//! - `RIOT_GEO_URL` - Region lookup service
//! - `RIOT_PD_URL` - Storefront base override (default: derived from the player's shard)
//! - `RIOT_VERSION_URL` - Client version lookup
//! - `RIOT_CLIENT_VERSION` - Pin the client version instead of looking it up
//! - `RIOT_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: transport default)
//!
//! ## Error tracking
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_AUTH_URL: &str = "https://auth.riotgames.com";
pub const DEFAULT_ENTITLEMENTS_URL: &str = "https://entitlements.auth.riotgames.com";
pub const DEFAULT_GEO_URL: &str = "https://riot-geo.pas.si.riotgames.com";
pub const DEFAULT_VERSION_URL: &str = "https://valorant-api.com/v1/version";
pub const DEFAULT_ASSET_CATALOG_URL: &str = "https://valorant-api.com/v1/weapons/skinlevels";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which presentation host to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// All-interfaces server; login by pasting the redirect URL.
    #[default]
    Web,
    /// Loopback server driven by a window host; login by URL polling.
    Desktop,
}

impl Variant {
    /// Default bind address for this variant.
    #[must_use]
    pub const fn default_host(self) -> IpAddr {
        match self {
            Self::Web => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            Self::Desktop => IpAddr::V4(Ipv4Addr::LOCALHOST),
        }
    }

    /// Default listen port for this variant.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Web => 8000,
            Self::Desktop => 23456,
        }
    }

    /// Whether this variant serves HTTPS when a certificate pair is present.
    #[must_use]
    pub const fn uses_tls(self) -> bool {
        matches!(self, Self::Web)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "web" => Ok(Self::Web),
            "desktop" => Ok(Self::Desktop),
            other => Err(format!("expected 'web' or 'desktop', got '{other}'")),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct DsfConfig {
    /// Presentation host variant
    pub variant: Variant,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Certificate/key pair, used only if both files exist
    pub tls: TlsPaths,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Skin catalog sources
    pub assets: AssetCatalogConfig,
    /// Riot API endpoints
    pub riot: RiotConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Emit JSON-formatted logs
    pub log_json: bool,
}

/// TLS certificate and key locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl TlsPaths {
    /// Whether both files are present on disk.
    #[must_use]
    pub fn exist(&self) -> bool {
        self.cert.is_file() && self.key.is_file()
    }
}

/// Skin catalog sources.
#[derive(Debug, Clone)]
pub struct AssetCatalogConfig {
    /// Bundled catalog file (offline fallback)
    pub bundled_path: PathBuf,
    /// Remote catalog URL, `None` to stay offline
    pub remote_url: Option<String>,
}

/// Riot API endpoints.
#[derive(Debug, Clone)]
pub struct RiotConfig {
    /// Identity provider origin (authorize, userinfo)
    pub auth_url: String,
    /// Entitlements service origin
    pub entitlements_url: String,
    /// Region lookup service origin
    pub geo_url: String,
    /// Storefront origin override; derived from the shard when `None`
    pub pd_url: Option<String>,
    /// Client version lookup URL
    pub version_url: String,
    /// Pinned client version
    pub client_version: Option<String>,
    /// Per-request timeout
    pub request_timeout: Option<Duration>,
}

impl Default for RiotConfig {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            entitlements_url: DEFAULT_ENTITLEMENTS_URL.to_string(),
            geo_url: DEFAULT_GEO_URL.to_string(),
            pd_url: None,
            version_url: DEFAULT_VERSION_URL.to_string(),
            client_version: None,
            request_timeout: None,
        }
    }
}

impl RiotConfig {
    /// The Riot authorize URL that starts an interactive login.
    #[must_use]
    pub fn authorize_url(&self) -> String {
        dsf_core::authorize_url(&self.auth_url)
    }
}

impl DsfConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let variant = env.parsed("DSF_VARIANT")?.unwrap_or_default();
        let host = env
            .parsed("DSF_HOST")?
            .unwrap_or_else(|| Variant::default_host(variant));
        let port = env
            .parsed("DSF_PORT")?
            .unwrap_or_else(|| Variant::default_port(variant));

        let tls = TlsPaths {
            cert: env.path_or("DSF_TLS_CERT_PATH", "cert.pem"),
            key: env.path_or("DSF_TLS_KEY_PATH", "key.pem"),
        };

        let assets = AssetCatalogConfig {
            bundled_path: env.path_or("DSF_ASSET_CATALOG_PATH", "crates/server/assets/skins.json"),
            remote_url: match env.get("DSF_ASSET_CATALOG_URL") {
                Some(url) if url.trim().is_empty() => None,
                Some(url) => Some(url),
                None => Some(DEFAULT_ASSET_CATALOG_URL.to_string()),
            },
        };

        let riot = RiotConfig {
            auth_url: env.or_default("RIOT_AUTH_URL", DEFAULT_AUTH_URL),
            entitlements_url: env.or_default("RIOT_ENTITLEMENTS_URL", DEFAULT_ENTITLEMENTS_URL),
            geo_url: env.or_default("RIOT_GEO_URL", DEFAULT_GEO_URL),
            pd_url: env.get("RIOT_PD_URL"),
            version_url: env.or_default("RIOT_VERSION_URL", DEFAULT_VERSION_URL),
            client_version: env.get("RIOT_CLIENT_VERSION"),
            request_timeout: env
                .parsed::<u64>("RIOT_REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs),
        };

        Ok(Self {
            variant,
            host,
            port,
            tls,
            static_dir: env.path_or("DSF_STATIC_DIR", "crates/server/static"),
            assets,
            riot,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
            log_json: env
                .get("DSF_LOG_JSON")
                .is_some_and(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes")),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// TLS files to serve with, if this variant uses TLS and both exist.
    #[must_use]
    pub fn tls_files(&self) -> Option<(&Path, &Path)> {
        (self.variant.uses_tls() && self.tls.exist())
            .then(|| (self.tls.cert.as_path(), self.tls.key.as_path()))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Thin wrapper over a key lookup with typed accessors.
struct Env<'a, F>(&'a F);

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating empty values as set.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Get a path variable with a default value.
    fn path_or(&self, key: &str, default: &str) -> PathBuf {
        PathBuf::from(self.or_default(key, default))
    }

    /// Parse an optional variable.
    fn parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            })
            .transpose()
    }
}
