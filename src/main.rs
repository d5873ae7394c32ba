use std::sync::Arc;

use color_eyre::eyre::{Result, eyre};
use counselsync_api::config::{ApiConfig, StoreBackend};
use counselsync_core::store::DocumentStore;
use counselsync_db::{MemoryStore, PgStore, create_pool, schema::initialize_database};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv::dotenv().ok();

    let config = ApiConfig::from_env()?;

    let store: Arc<dyn DocumentStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| eyre!("DATABASE_URL must be set for the postgres backend"))?;
            let db_pool = create_pool(database_url).await?;
            initialize_database(&db_pool).await?;
            Arc::new(PgStore::new(db_pool))
        }
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };

    counselsync_api::start_server(config, store).await?;

    Ok(())
}
