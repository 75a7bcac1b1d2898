//! services/api/src/error.rs
//!
//! Startup and wiring failures of the seminar service. Request-time failures
//! are `ServiceError`s from the core and are mapped to HTTP in `web::rest`.

use crate::config::ConfigError;
use seminar_core::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The key-value store could not be opened or loaded.
    #[error("Store error: {0}")]
    Port(#[from] PortError),

    /// Connecting to the hosted `kv` database failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Binding the listener or serving.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
