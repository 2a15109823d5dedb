//! Services composed by the route handlers.
//!
//! # Services
//!
//! - `identity` - In-memory session and token extraction
//! - `assets` - Skin catalog (offer identifier to name and icon)

pub mod assets;
pub mod identity;

pub use assets::{AssetCatalog, AssetError};
pub use identity::Session;
