//! services/api/src/adapters/file_kv.rs
//!
//! The local key-value backend: a persistent map kept in memory and written
//! through to a single JSON file on every change.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use seminar_core::ports::{KeyValueStore, KvDeleted, KvEntry, KvKeys, PortError, PortResult};
use tokio::sync::Mutex;
use tracing::info;

/// Filesystem-backed KeyValueStore that survives restarts.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`, starting empty when the file does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> PortResult<Self> {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                PortError::Unexpected(format!("Corrupt store file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(io_error(&path, e)),
        };
        info!("Opened local store {} ({} keys)", path.display(), entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Writes the whole map to a sibling temp file, then renames it over the original.
    async fn persist(&self, entries: &BTreeMap<String, String>) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
        let encoded =
            serde_json::to_vec_pretty(entries).map_err(|e| PortError::Unexpected(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, encoded)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error(&self.path, e))
    }
}

fn io_error(path: &Path, e: std::io::Error) -> PortError {
    PortError::Unexpected(format!("{}: {}", path.display(), e))
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> PortResult<KvEntry> {
        let entries = self.entries.lock().await;
        let value = entries
            .get(key)
            .cloned()
            .ok_or_else(|| PortError::NotFound(key.to_string()))?;
        Ok(KvEntry {
            key: key.to_string(),
            value,
        })
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<KvEntry> {
        let mut entries = self.entries.lock().await;
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&entries).await {
            // Keep memory and disk in agreement.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(KvEntry {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> PortResult<KvDeleted> {
        let mut entries = self.entries.lock().await;
        if let Some(old) = entries.remove(key) {
            if let Err(e) = self.persist(&entries).await {
                entries.insert(key.to_string(), old);
                return Err(e);
            }
        }
        Ok(KvDeleted {
            key: key.to_string(),
            deleted: true,
        })
    }

    async fn list(&self, prefix: &str) -> PortResult<KvKeys> {
        let keys = self
            .entries
            .lock()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        Ok(KvKeys {
            keys,
            prefix: prefix.to_string(),
        })
    }
}
