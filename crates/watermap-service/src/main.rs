//! WaterMap Service - HTTP API for the water-point catalog and loyalty
//! ledger.
//!
//! This is the main entry point for the watermap service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use watermap_service::handlers::admin::ensure_bootstrap_admin;
use watermap_service::{create_router, AppState, ServiceConfig};
use watermap_store::SqliteStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,watermap=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting WaterMap Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        database_url = %config.database_url,
        "Service configuration loaded"
    );

    // Open the database and apply the schema explicitly, before serving
    let store = Arc::new(SqliteStore::connect(&config.database_url).await?);
    store.migrate().await?;

    // First-run admin bootstrap
    ensure_bootstrap_admin(&store, &config).await?;

    // Build app state and router
    let state = AppState::new(store, config.clone());
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
