use std::sync::Arc;

use anyhow::Context;

use stall_api::identity::HttpIdentityProvider;
use stall_api::store::PostgresStore;
use stall_api::{app, config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_BASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Stall API in {:?} mode", config.environment);

    let identity = HttpIdentityProvider::from_config()
        .context("AUTH_BASE_URL is not a valid URL")?;
    let store = PostgresStore::from_env().context("database configuration")?;

    let state = AppState {
        identity: Arc::new(identity),
        store: Arc::new(store),
    };

    // Allow tests or deployments to override port via env
    let port = std::env::var("STALL_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Stall API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server")?;
    Ok(())
}
