//! Registry entry point: migrates the schema and reports the pending batch.

use order_store::PostgresStore;
use registry::{Config, RegistryError, StudentOrderRegistry};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), RegistryError> {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Connect and migrate
    let pool = config.connect().await?;
    let store = PostgresStore::new(pool);
    store.run_migrations().await?;
    tracing::info!(max_connections = config.max_connections, "database ready");

    // 3. Read the pending batch
    let registry = StudentOrderRegistry::new(store, config.db_limit);
    let orders = registry.list_pending_orders_default().await?;

    for order in &orders {
        if let Some(order_id) = order.id() {
            tracing::info!(
                %order_id,
                children = order.child_count(),
                "pending order"
            );
        }
    }
    tracing::info!(count = orders.len(), limit = config.db_limit, "pending batch read");

    registry.store().pool().close().await;
    Ok(())
}
