//! Shopfront boundary server
//!
//! Thin HTTP layer between the storefront frontend and the CMS: consumes the
//! products facade from `shopfront-api-client`, reshapes raw records into
//! the public product shape and re-exposes them under `/api/products`.

use anyhow::Result;
use clap::Parser;
use shopfront_api_client::{ClientConfig, ShopfrontClient};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod mapping;
mod routes;
mod state;

use state::AppState;

#[derive(Parser)]
#[command(name = "shopfront-server")]
#[command(about = "Storefront API over the Shopfront CMS")]
#[command(version)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "SHOPFRONT_PORT", default_value_t = 8787)]
    port: u16,

    /// CMS base URL (overrides SHOPFRONT_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Asset base URL for resolving relative image references
    #[arg(long, env = "SHOPFRONT_ASSET_URL")]
    asset_url: Option<String>,

    /// CMS collection holding products
    #[arg(long, env = "SHOPFRONT_COLLECTION", default_value = "Products")]
    collection: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config = config.with_base_url(url);
    }

    // Asset URL defaults to the CMS assets endpoint when a base URL exists.
    let asset_base = cli
        .asset_url
        .or_else(|| config.base_url().map(|base| format!("{base}/assets")));

    let client = ShopfrontClient::new(config)?;
    let products =
        shopfront_api_client::ProductsApi::with_collection(client, &cli.collection);
    let app = routes::router(AppState::new(products, asset_base));

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "shopfront-server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
