use std::net::{IpAddr, SocketAddr};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use catalog_api::config::AppConfig;
use catalog_api::database::DatabaseManager;
use catalog_api::{app, AppState};

#[derive(Parser)]
#[command(name = "catalog-api")]
#[command(about = "REST API over the store catalog, customers and orders")]
#[command(version)]
struct Args {
    #[arg(long, env = "HOST", help = "Address to bind (overrides the environment preset)")]
    host: Option<IpAddr>,

    #[arg(long, env = "PORT", help = "Port to bind")]
    port: Option<u16>,

    #[arg(long, help = "Create missing tables from the bundled schema before serving")]
    init_schema: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, API_TOKEN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!(
        "Starting catalog API in {:?} mode (sort policy {:?})",
        config.environment,
        config.listing.sort_policy
    );

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    if args.init_schema {
        DatabaseManager::apply_schema(&pool).await.context("failed to apply schema")?;
    }

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = AppState::new(config, pool).context("failed to build upstream client")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Catalog API listening on http://{}", addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
