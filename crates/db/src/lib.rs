//! Storage backends for CounselSync: PostgreSQL for deployments and an
//! in-memory store for development and tests. Both implement
//! [`counselsync_core::store::DocumentStore`].

pub mod memory;
pub mod models;
pub mod postgres;
pub mod repositories;
pub mod schema;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}
