//! crates/seminar_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! Every component persists through `KeyValueStore`, so the hosted and local
//! backends stay interchangeable.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Key \"{0}\" not found")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Key-Value Store
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvDeleted {
    pub key: String,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvKeys {
    pub keys: Vec<String>,
    pub prefix: String,
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fails with `PortError::NotFound` when the key is absent.
    async fn get(&self, key: &str) -> PortResult<KvEntry>;

    /// Overwrites unconditionally.
    async fn set(&self, key: &str, value: &str) -> PortResult<KvEntry>;

    /// Succeeds even if the key was already absent.
    async fn delete(&self, key: &str) -> PortResult<KvDeleted>;

    /// Lists every key starting with `prefix`. An empty prefix lists everything.
    async fn list(&self, prefix: &str) -> PortResult<KvKeys>;
}

/// Reads and decodes a JSON value.
pub async fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> PortResult<T> {
    let entry = store.get(key).await?;
    serde_json::from_str(&entry.value)
        .map_err(|e| PortError::Unexpected(format!("Malformed value under \"{}\": {}", key, e)))
}

/// Reads and decodes a JSON value, mapping an absent key to `None`.
pub async fn find_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> PortResult<Option<T>> {
    match get_json(store, key).await {
        Ok(value) => Ok(Some(value)),
        Err(PortError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Encodes a value as JSON and stores it.
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> PortResult<()> {
    let encoded = serde_json::to_string(value).map_err(|e| PortError::Unexpected(e.to_string()))?;
    store.set(key, &encoded).await?;
    Ok(())
}

//=========================================================================================
// Other Service Ports
//=========================================================================================

pub trait CredentialHasher: Send + Sync {
    /// Produces a self-describing hash string suitable for storage.
    fn hash(&self, password: &str) -> PortResult<String>;

    /// Returns `Ok(false)` on mismatch; errors only when the stored hash is unreadable.
    fn verify(&self, password: &str, stored_hash: &str) -> PortResult<bool>;
}

/// Chooses an index in `0..len`. `len` is always non-zero.
pub trait TopicPicker: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

/// Uniform choice backed by the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPicker;

impl TopicPicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        use rand::Rng;
        rand::thread_rng().gen_range(0..len)
    }
}
