//! Integration test harness for the storefront server.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p dsf-integration-tests
//! ```
//!
//! Each test spins up two in-process servers on ephemeral ports:
//!
//! - [`FakeRiot`] - answers the entitlements, userinfo, region and storefront
//!   endpoints and records every request it sees
//! - [`TestServer`] - the real router, configured to talk to the fake
//!
//! Tests then drive the server over HTTP with `reqwest`.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
};
use dsf_server::login::PollSettings;
use dsf_server::services::AssetCatalog;
use dsf_server::services::assets::SkinLevel;
use dsf_server::{AppState, DsfConfig, build_router};
use serde_json::{Value, json};

/// Player UUID the fake upstream reports.
pub const PLAYER_UUID: &str = "7f3c1c52-0000-4000-8000-00000000a11c";
/// Entitlements JWT the fake upstream issues.
pub const ENTITLEMENTS_JWT: &str = "fake-entitlements-jwt";
/// Client version pinned in the server under test.
pub const CLIENT_VERSION: &str = "release-test-01";
/// A redirect URL carrying both tokens.
pub const GOOD_REDIRECT: &str =
    "https://playvalorant.com/opt_in#access_token=acc-123&scope=account+openid&id_token=idt-456&token_type=Bearer&expires_in=3600";

/// One request seen by the fake upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub endpoint: &'static str,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

#[derive(Clone)]
struct FakeState {
    storefront: Value,
    storefront_status: StatusCode,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeState {
    fn record(&self, endpoint: &'static str, headers: HeaderMap, body: Option<Value>) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                endpoint,
                headers,
                body,
            });
    }
}

/// In-process stand-in for the Riot APIs.
pub struct FakeRiot {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeRiot {
    /// Serve `payload` as the storefront document.
    pub async fn spawn(payload: Value) -> Self {
        Self::spawn_with_status(payload, StatusCode::OK).await
    }

    /// Serve `payload` with the given storefront status code.
    pub async fn spawn_with_status(payload: Value, storefront_status: StatusCode) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            storefront: payload,
            storefront_status,
            requests: Arc::clone(&requests),
        };

        let app = Router::new()
            .route("/api/token/v1", post(entitlements))
            .route("/userinfo", get(userinfo))
            .route("/pas/v1/product/valorant", put(region))
            .route("/store/v2/storefront/{puuid}", get(storefront_offers))
            .with_state(state);

        let addr = serve(app).await;
        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    /// Every request seen so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The first request to `endpoint`, if any.
    #[must_use]
    pub fn request_to(&self, endpoint: &str) -> Option<RecordedRequest> {
        self.requests().into_iter().find(|r| r.endpoint == endpoint)
    }
}

async fn entitlements(State(state): State<FakeState>, headers: HeaderMap) -> Json<Value> {
    state.record("entitlements", headers, None);
    Json(json!({ "entitlements_token": ENTITLEMENTS_JWT }))
}

async fn userinfo(State(state): State<FakeState>, headers: HeaderMap) -> Json<Value> {
    state.record("userinfo", headers, None);
    Json(json!({ "sub": PLAYER_UUID, "country": "usa" }))
}

async fn region(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.record("region", headers, Some(body));
    Json(json!({ "token": "x", "affinities": { "pbe": "na", "live": "eu" } }))
}

async fn storefront_offers(
    State(state): State<FakeState>,
    Path(puuid): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.record("storefront", headers, Some(json!({ "puuid": puuid })));
    (state.storefront_status, Json(state.storefront.clone()))
}

/// The storefront server under test.
pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Start a server of `variant` pointed at `riot` with `skins` in its catalog.
    pub async fn spawn(variant: &str, riot: &FakeRiot, skins: Vec<SkinLevel>) -> Self {
        let vars: HashMap<&str, String> = [
            ("DSF_VARIANT", variant.to_string()),
            ("RIOT_AUTH_URL", riot.base_url.clone()),
            ("RIOT_ENTITLEMENTS_URL", riot.base_url.clone()),
            ("RIOT_GEO_URL", riot.base_url.clone()),
            ("RIOT_PD_URL", riot.base_url.clone()),
            ("RIOT_CLIENT_VERSION", CLIENT_VERSION.to_string()),
            ("RIOT_REQUEST_TIMEOUT_SECS", "5".to_string()),
            ("DSF_ASSET_CATALOG_URL", String::new()),
        ]
        .into_iter()
        .collect();
        let config = DsfConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();

        let state = AppState::with_poll_settings(
            config,
            AssetCatalog::from_levels(skins),
            PollSettings {
                interval: Duration::from_millis(5),
                max_attempts: 2_000,
            },
        )
        .unwrap();

        let addr = serve(build_router(state.clone())).await;
        Self {
            base_url: format!("http://{addr}"),
            state,
            client: reqwest::Client::new(),
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post(&self, path: &str) -> reqwest::Response {
        self.client.post(self.url(path)).send().await.unwrap()
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .unwrap()
    }
}

/// A skin level entry for the test catalog.
#[must_use]
pub fn skin(uuid: &str, name: &str) -> SkinLevel {
    SkinLevel {
        uuid: uuid.to_string(),
        display_name: name.to_string(),
        display_icon: Some(format!(
            "https://media.valorant-api.com/weaponskinlevels/{uuid}/displayicon.png"
        )),
    }
}

/// A storefront payload with the given daily offers and priced offers.
#[must_use]
pub fn storefront_payload(offers: &[&str], prices: &[(&str, u64)]) -> Value {
    let store_offers: Vec<Value> = prices
        .iter()
        .map(|(id, cost)| {
            let mut cost_map = serde_json::Map::new();
            cost_map.insert(dsf_core::VALORANT_POINTS.to_string(), json!(cost));
            json!({
                "OfferID": id,
                "IsDirectPurchase": true,
                "Cost": cost_map,
                "Rewards": [{ "ItemTypeID": "e7c63390-eda7-46e0-bb7a-a6abdacd2433", "ItemID": id, "Quantity": 1 }]
            })
        })
        .collect();

    json!({
        "FeaturedBundle": { "Bundles": [] },
        "SkinsPanelLayout": {
            "SingleItemOffers": offers,
            "SingleItemStoreOffers": store_offers,
            "SingleItemOffersRemainingDurationInSeconds": 43_200
        }
    })
}

/// Bind `app` to an ephemeral loopback port and serve it in the background.
async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
