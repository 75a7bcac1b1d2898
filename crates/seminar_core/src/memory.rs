use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{KeyValueStore, KvDeleted, KvEntry, KvKeys, PortError, PortResult};

/// In-memory KeyValueStore for testing and ephemeral runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| PortError::Unexpected("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> PortResult<KvEntry> {
        let value = self
            .lock()?
            .get(key)
            .cloned()
            .ok_or_else(|| PortError::NotFound(key.to_string()))?;
        Ok(KvEntry {
            key: key.to_string(),
            value,
        })
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<KvEntry> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(KvEntry {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> PortResult<KvDeleted> {
        self.lock()?.remove(key);
        Ok(KvDeleted {
            key: key.to_string(),
            deleted: true,
        })
    }

    async fn list(&self, prefix: &str) -> PortResult<KvKeys> {
        let keys = self
            .lock()?
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

/// A MemoryStore whose writes and deletes fail for keys under chosen prefixes.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub(crate) struct FailingStore {
    inner: MemoryStore,
    failing_sets: Arc<Mutex<Vec<String>>>,
    failing_deletes: Arc<Mutex<Vec<String>>>,
}

#[cfg(test)]
impl FailingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_sets(&self, prefix: &str) {
        self.failing_sets.lock().unwrap().push(prefix.to_string());
    }

    pub(crate) fn fail_deletes(&self, prefix: &str) {
        self.failing_deletes.lock().unwrap().push(prefix.to_string());
    }

    fn check(prefixes: &Mutex<Vec<String>>, key: &str) -> PortResult<()> {
        if prefixes.lock().unwrap().iter().any(|p| key.starts_with(p)) {
            return Err(PortError::Unexpected(format!("refusing to touch {}", key)));
        }
        Ok(())
    }
}

#[cfg(test)]
#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, key: &str) -> PortResult<KvEntry> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> PortResult<KvEntry> {
        Self::check(&self.failing_sets, key)?;
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> PortResult<KvDeleted> {
        Self::check(&self.failing_deletes, key)?;
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> PortResult<KvKeys> {
        self.inner.list(prefix).await
    }
}
