//! Core types for Valorant DSF.
//!
//! This module provides type-safe wrappers for the identity tokens, the raw
//! storefront payload and the display-ready items built from it.

pub mod item;
pub mod storefront;
pub mod tokens;

pub use item::{DisplayItem, ItemPrice, SkinInfo, SkinResolver, UNKNOWN_PRICE};
pub use storefront::{
    SkinsPanelLayout, StoreOffer, Storefront, VALORANT_POINTS, build_price_map,
    compose_display_items,
};
pub use tokens::{ACCESS_TOKEN_MARKER, AuthTokens, TokenError, authorize_url, has_access_token};
