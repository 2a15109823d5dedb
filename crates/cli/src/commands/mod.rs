//! CLI command implementations.

pub mod assets;
pub mod login;
pub mod store;

use dsf_server::DsfConfig;
use dsf_server::config::ConfigError;

/// Load the shared server configuration.
pub fn config() -> Result<DsfConfig, ConfigError> {
    DsfConfig::from_env()
}
