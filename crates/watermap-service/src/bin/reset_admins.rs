//! Maintenance utility: delete every admin row.
//!
//! This is the only way to remove the last admin — the HTTP surface never
//! does. After a reset, the next service start (or `/admin-create` call)
//! re-bootstraps the well-known admin account.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use watermap_store::{SqliteStore, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,watermap=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://watermap.db".into());

    let store = Arc::new(SqliteStore::connect(&database_url).await?);
    store.migrate().await?;

    let removed = store.delete_all_admins().await?;

    tracing::info!(removed, "Admin accounts deleted");

    Ok(())
}
