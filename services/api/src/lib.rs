pub mod adapters;
pub mod config;
pub mod error;
pub mod web;

use std::sync::Arc;

use seminar_core::ports::KeyValueStore;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::adapters::{FileStore, PgKvAdapter};
use crate::config::StorageBackend;
use crate::error::ApiError;

/// Opens the key-value backend named by the configuration.
pub async fn connect_store(backend: &StorageBackend) -> Result<Arc<dyn KeyValueStore>, ApiError> {
    match backend {
        StorageBackend::Hosted { database_url } => {
            info!("Connecting to hosted store...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let adapter = PgKvAdapter::new(db_pool);
            info!("Running database migrations...");
            adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Ok(Arc::new(adapter))
        }
        StorageBackend::Local { path } => {
            info!("Using local store at {}", path.display());
            Ok(Arc::new(FileStore::open(path.clone()).await?))
        }
    }
}
