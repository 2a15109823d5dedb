//! Valorant daily storefront CLI.
//!
//! # Usage
//!
//! ```bash
//! # Print the Riot sign-in URL
//! dsf-cli login-url
//!
//! # Check that a pasted redirect URL carries both tokens
//! dsf-cli check-url 'https://playvalorant.com/opt_in#access_token=...&id_token=...'
//!
//! # Fetch and print today's store
//! dsf-cli store --redirect-url 'https://playvalorant.com/opt_in#access_token=...'
//!
//! # Look up a skin level in the catalog
//! dsf-cli assets lookup 5ce4a9c4-4c0b-4c79-8e9a-7d3a1c7b2e01
//!
//! # Refresh the bundled catalog from valorant-api.com
//! dsf-cli assets export --output crates/server/assets/skins.json
//! ```
//!
//! Configuration comes from the same environment variables as the server
//! (`RIOT_*`, `DSF_ASSET_CATALOG_*`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "dsf-cli")]
#[command(author, version, about = "Valorant daily storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the Riot sign-in URL
    LoginUrl,
    /// Check a redirect URL for access and ID tokens
    CheckUrl {
        /// Redirect URL copied from the browser
        url: String,
    },
    /// Fetch today's store and print it as JSON
    Store {
        /// Redirect URL copied from the browser after signing in
        #[arg(short, long)]
        redirect_url: String,
    },
    /// Skin catalog tools
    Assets {
        #[command(subcommand)]
        action: AssetsAction,
    },
}

#[derive(Subcommand)]
enum AssetsAction {
    /// Resolve a skin level UUID to its name and icon
    Lookup {
        /// Skin level UUID
        uuid: String,
    },
    /// Download the remote catalog to a file
    Export {
        /// Destination file
        #[arg(short, long, default_value = "crates/server/assets/skins.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::LoginUrl => commands::login::login_url()?,
        Commands::CheckUrl { url } => commands::login::check_url(&url)?,
        Commands::Store { redirect_url } => commands::store::fetch(&redirect_url).await?,
        Commands::Assets { action } => match action {
            AssetsAction::Lookup { uuid } => commands::assets::lookup(&uuid).await?,
            AssetsAction::Export { output } => commands::assets::export(&output).await?,
        },
    }
    Ok(())
}
