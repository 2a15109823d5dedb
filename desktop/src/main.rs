//! Desktop shell for the Valorant daily storefront viewer.
//!
//! Runs the `desktop` variant of the server on loopback, shows its landing
//! page in the main window and hosts the Riot login windows in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod windows;

use std::sync::Arc;

use dsf_server::login::WindowHost;
use dsf_server::services::AssetCatalog;
use dsf_server::{AppState, DsfConfig, build_router};
use tauri::{RunEvent, WebviewUrl, WebviewWindowBuilder};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::windows::TauriLoginWindows;

const MAIN_WINDOW_TITLE: &str = "Valorant Daily Store";
const MAIN_WINDOW_WIDTH: f64 = 700.0;
const MAIN_WINDOW_HEIGHT: f64 = 400.0;

const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../crates/server/static");
const BUNDLED_CATALOG: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../crates/server/assets/skins.json"
);

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn load_config() -> Result<DsfConfig, BoxError> {
    let _ = dotenvy::dotenv();
    let config = DsfConfig::from_lookup(|key| match key {
        "DSF_VARIANT" => Some("desktop".to_string()),
        "DSF_STATIC_DIR" => std::env::var(key).ok().or_else(|| Some(STATIC_DIR.to_string())),
        "DSF_ASSET_CATALOG_PATH" => std::env::var(key)
            .ok()
            .or_else(|| Some(BUNDLED_CATALOG.to_string())),
        _ => std::env::var(key).ok(),
    })?;
    Ok(config)
}

fn init_tracing(config: &DsfConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "dsf_server=info,dsf_desktop=info".into());

    let json_layer = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!config.log_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn run() -> Result<(), BoxError> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "rustls crypto provider already installed")?;

    let config = load_config()?;
    init_tracing(&config);

    let shutdown = CancellationToken::new();

    let (state, addr) = tauri::async_runtime::block_on(async {
        let assets = AssetCatalog::load(&config.assets).await;
        let state = AppState::new(config.clone(), assets)?;

        let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
        let addr = listener.local_addr()?;
        tracing::info!(variant = %config.variant, "dsf listening on http://{}", addr);

        let app = build_router(state.clone());
        let stop = shutdown.clone();
        tauri::async_runtime::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(stop.cancelled_owned())
                .await
            {
                tracing::error!(error = %e, "Embedded server stopped");
            }
        });

        Ok::<_, BoxError>((state, addr))
    })?;

    let main_url: tauri::Url = format!("http://{addr}/").parse()?;
    let host_shutdown = shutdown.clone();

    let app = tauri::Builder::default()
        .setup(move |app| {
            WebviewWindowBuilder::new(app, "main", WebviewUrl::External(main_url))
                .title(MAIN_WINDOW_TITLE)
                .inner_size(MAIN_WINDOW_WIDTH, MAIN_WINDOW_HEIGHT)
                .build()?;

            let flow = state.login().clone();
            let windows = TauriLoginWindows::new(app.handle().clone(), flow.clone());
            let host = WindowHost::new(flow, Arc::new(windows));
            tauri::async_runtime::spawn(host.run(host_shutdown));
            Ok(())
        })
        .build(tauri::generate_context!())?;

    app.run(move |_, event| {
        if let RunEvent::Exit = event {
            tracing::info!("Desktop shell exiting, stopping embedded server");
            shutdown.cancel();
        }
    });

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("dsf-desktop failed: {e}");
        std::process::exit(1);
    }
}
