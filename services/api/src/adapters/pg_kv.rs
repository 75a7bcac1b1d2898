//! services/api/src/adapters/pg_kv.rs
//!
//! The hosted key-value backend: every record lives in a single `kv` table in
//! PostgreSQL. Implements the `KeyValueStore` port from the `core` crate.

use async_trait::async_trait;
use seminar_core::ports::{KeyValueStore, KvDeleted, KvEntry, KvKeys, PortError, PortResult};
use sqlx::PgPool;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `KeyValueStore` port.
#[derive(Clone)]
pub struct PgKvAdapter {
    pool: PgPool,
}

impl PgKvAdapter {
    /// Creates a new `PgKvAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `KeyValueStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl KeyValueStore for PgKvAdapter {
    async fn get(&self, key: &str) -> PortResult<KvEntry> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(key.to_string()))?;
        Ok(KvEntry {
            key: key.to_string(),
            value,
        })
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<KvEntry> {
        sqlx::query(
            "INSERT INTO kv (key, value, updated_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(KvEntry {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> PortResult<KvDeleted> {
        // Deleting a missing row affects zero rows and is not an error.
        sqlx::query("DELETE FROM kv WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(KvDeleted {
            key: key.to_string(),
            deleted: true,
        })
    }

    async fn list(&self, prefix: &str) -> PortResult<KvKeys> {
        let keys = sqlx::query_scalar::<_, String>(
            "SELECT key FROM kv WHERE starts_with(key, $1) ORDER BY key",
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(KvKeys {
            keys,
            prefix: prefix.to_string(),
        })
    }
}
