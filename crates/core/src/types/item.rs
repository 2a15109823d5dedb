//! Display-ready storefront items.

use core::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Placeholder rendered when an offer has no known price.
pub const UNKNOWN_PRICE: &str = "???";

/// Price of a display item in Valorant Points.
///
/// Serializes as a bare number, or as the string `"???"` when unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemPrice {
    /// Cost under the Valorant Points currency.
    Amount(u64),
    /// No cost recorded for this offer (bundles, free rotations).
    Unknown,
}

impl ItemPrice {
    /// Returns the amount, if known.
    #[must_use]
    pub const fn amount(&self) -> Option<u64> {
        match self {
            Self::Amount(amount) => Some(*amount),
            Self::Unknown => None,
        }
    }
}

impl From<Option<u64>> for ItemPrice {
    fn from(amount: Option<u64>) -> Self {
        amount.map_or(Self::Unknown, Self::Amount)
    }
}

impl fmt::Display for ItemPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(amount) => write!(f, "{amount}"),
            Self::Unknown => f.write_str(UNKNOWN_PRICE),
        }
    }
}

impl Serialize for ItemPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Amount(amount) => serializer.serialize_u64(*amount),
            Self::Unknown => serializer.serialize_str(UNKNOWN_PRICE),
        }
    }
}

/// Display metadata for a single skin level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinInfo {
    /// Human-readable skin name.
    pub name: String,
    /// Icon URL or path.
    pub icon: String,
}

/// Maps an item identifier to its display metadata.
///
/// Implementations must never fail: unknown identifiers resolve to a
/// fallback `SkinInfo`.
pub trait SkinResolver {
    /// Look up display metadata for an item identifier.
    fn get_skin_data(&self, uuid: &str) -> SkinInfo;
}

/// One storefront entry as rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayItem {
    pub uuid: String,
    pub name: String,
    pub icon: String,
    pub price: ItemPrice,
}
