//! Raw storefront payload and the price/item join.
//!
//! Only the daily skins panel is consumed. Everything else in the payload
//! (bundles, night market, accessory store) is ignored by deserialization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::item::{DisplayItem, ItemPrice, SkinResolver};

/// Currency identifier for Valorant Points.
pub const VALORANT_POINTS: &str = "85ad13f7-3d1b-5128-9eb2-7cd8ee0b5741";

/// Storefront payload as returned by the commerce endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Storefront {
    #[serde(rename = "SkinsPanelLayout", default)]
    pub skins_panel_layout: Option<SkinsPanelLayout>,
}

/// Daily rotation of single-skin offers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinsPanelLayout {
    /// Ordered identifiers of the items on display.
    #[serde(rename = "SingleItemOffers", default)]
    pub single_item_offers: Option<Vec<String>>,
    /// Offers with their costs.
    #[serde(rename = "SingleItemStoreOffers", default)]
    pub single_item_store_offers: Option<Vec<StoreOffer>>,
}

/// A purchasable entry with its cost per currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreOffer {
    #[serde(rename = "OfferID", default)]
    pub offer_id: Option<String>,
    #[serde(rename = "Cost", default)]
    pub cost: Option<HashMap<String, serde_json::Value>>,
}

impl StoreOffer {
    /// Cost in Valorant Points. Zero and non-integer costs count as absent.
    #[must_use]
    pub fn valorant_points(&self) -> Option<u64> {
        self.cost
            .as_ref()?
            .get(VALORANT_POINTS)?
            .as_u64()
            .filter(|cost| *cost > 0)
    }
}

impl Storefront {
    /// Identifiers of the items on display, in payload order.
    #[must_use]
    pub fn offer_ids(&self) -> &[String] {
        self.skins_panel_layout
            .as_ref()
            .and_then(|layout| layout.single_item_offers.as_deref())
            .unwrap_or_default()
    }

    /// Offers carrying prices.
    #[must_use]
    pub fn store_offers(&self) -> &[StoreOffer] {
        self.skins_panel_layout
            .as_ref()
            .and_then(|layout| layout.single_item_store_offers.as_deref())
            .unwrap_or_default()
    }
}

/// Map offer identifiers to their Valorant Points cost.
///
/// Offers without an identifier or without a cost are skipped.
#[must_use]
pub fn build_price_map(store: &Storefront) -> HashMap<&str, u64> {
    store
        .store_offers()
        .iter()
        .filter_map(|offer| {
            let id = offer.offer_id.as_deref().filter(|id| !id.is_empty())?;
            Some((id, offer.valorant_points()?))
        })
        .collect()
}

/// Join the displayed offers with their prices and display metadata.
///
/// Every identifier in the display list yields exactly one item, in order.
/// Missing prices become [`ItemPrice::Unknown`].
pub fn compose_display_items<R>(store: &Storefront, resolver: &R) -> Vec<DisplayItem>
where
    R: SkinResolver + ?Sized,
{
    let prices = build_price_map(store);

    store
        .offer_ids()
        .iter()
        .map(|uuid| {
            let skin = resolver.get_skin_data(uuid);
            DisplayItem {
                uuid: uuid.clone(),
                name: skin.name,
                icon: skin.icon,
                price: ItemPrice::from(prices.get(uuid.as_str()).copied()),
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::item::SkinInfo;

    struct NamedResolver;

    impl SkinResolver for NamedResolver {
        fn get_skin_data(&self, uuid: &str) -> SkinInfo {
            SkinInfo {
                name: format!("Skin {uuid}"),
                icon: format!("/icons/{uuid}.png"),
            }
        }
    }

    fn payload(value: serde_json::Value) -> Storefront {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_scenario_known_and_unknown_price() {
        let store = payload(json!({
            "SkinsPanelLayout": {
                "SingleItemOffers": ["A", "B"],
                "SingleItemStoreOffers": [
                    { "OfferID": "A", "Cost": { VALORANT_POINTS: 100 } }
                ]
            }
        }));

        let items = compose_display_items(&store, &NamedResolver);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].uuid, "A");
        assert_eq!(items[0].price, ItemPrice::Amount(100));
        assert_eq!(items[0].name, "Skin A");
        assert_eq!(items[1].uuid, "B");
        assert_eq!(items[1].price, ItemPrice::Unknown);
        assert_eq!(items[1].icon, "/icons/B.png");
    }

    #[test]
    fn test_order_preserved_and_each_id_once() {
        let ids = ["d", "a", "c", "b"];
        let store = payload(json!({
            "SkinsPanelLayout": { "SingleItemOffers": ids }
        }));

        let items = compose_display_items(&store, &NamedResolver);
        let uuids: Vec<_> = items.iter().map(|i| i.uuid.as_str()).collect();
        assert_eq!(uuids, ids);
    }

    #[test]
    fn test_empty_display_list() {
        let store = payload(json!({
            "SkinsPanelLayout": {
                "SingleItemOffers": [],
                "SingleItemStoreOffers": [
                    { "OfferID": "A", "Cost": { VALORANT_POINTS: 100 } }
                ]
            }
        }));
        assert!(compose_display_items(&store, &NamedResolver).is_empty());
    }

    #[test]
    fn test_missing_layout_is_empty() {
        let store = payload(json!({ "FeaturedBundle": {} }));
        assert!(compose_display_items(&store, &NamedResolver).is_empty());

        let store = payload(json!({ "SkinsPanelLayout": null }));
        assert!(compose_display_items(&store, &NamedResolver).is_empty());
    }

    #[test]
    fn test_price_map_skips_incomplete_offers() {
        let store = payload(json!({
            "SkinsPanelLayout": {
                "SingleItemStoreOffers": [
                    { "OfferID": "no-cost" },
                    { "Cost": { VALORANT_POINTS: 875 } },
                    { "OfferID": "", "Cost": { VALORANT_POINTS: 875 } },
                    { "OfferID": "other-currency", "Cost": { "e59aa87c-4cbf-517a-5983-6e81511be9b7": 40 } },
                    { "OfferID": "free", "Cost": { VALORANT_POINTS: 0 } },
                    { "OfferID": "ok", "Cost": { VALORANT_POINTS: 1775 } }
                ]
            }
        }));

        let prices = build_price_map(&store);
        assert_eq!(prices.len(), 1);
        assert_eq!(prices.get("ok"), Some(&1775));
    }

    #[test]
    fn test_price_ignores_non_integer_cost() {
        let offer = StoreOffer {
            offer_id: Some("x".to_string()),
            cost: Some(HashMap::from([(
                VALORANT_POINTS.to_string(),
                json!("1775"),
            )])),
        };
        assert_eq!(offer.valorant_points(), None);
    }

    #[test]
    fn test_every_displayed_price_matches_map() {
        let store = payload(json!({
            "SkinsPanelLayout": {
                "SingleItemOffers": ["A", "B", "C"],
                "SingleItemStoreOffers": [
                    { "OfferID": "C", "Cost": { VALORANT_POINTS: 2175 } },
                    { "OfferID": "A", "Cost": { VALORANT_POINTS: 1275 } },
                    { "OfferID": "Z", "Cost": { VALORANT_POINTS: 999 } }
                ]
            }
        }));

        let prices = build_price_map(&store);
        for item in compose_display_items(&store, &NamedResolver) {
            match prices.get(item.uuid.as_str()) {
                Some(cost) => assert_eq!(item.price, ItemPrice::Amount(*cost)),
                None => assert_eq!(item.price, ItemPrice::Unknown),
            }
        }
    }
}
