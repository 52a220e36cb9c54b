use crate::store::{DataCache, ObjectStore, StoredObject};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

/// In-memory `DataCache` for tests and local/dev runs.
#[derive(Clone, Default)]
pub struct MemoryDataCache {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryDataCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataCache for MemoryDataCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().map_err(|_| anyhow!("poisoned cache"))?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow!("poisoned cache"))?;
        tracing::debug!("caching {} bytes under {key}", value.len());
        entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// In-memory `ObjectStore` for tests and local/dev runs.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn head(&self, key: &str) -> Result<bool> {
        let objects = self.objects.lock().map_err(|_| anyhow!("poisoned store"))?;
        Ok(objects.contains_key(key))
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        custom_metadata: HashMap<String, String>,
    ) -> Result<()> {
        let mut objects = self.objects.lock().map_err(|_| anyhow!("poisoned store"))?;
        tracing::debug!("storing {} bytes under {key}", bytes.len());
        objects.insert(
            key.to_string(),
            StoredObject {
                bytes,
                custom_metadata,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        let objects = self.objects.lock().map_err(|_| anyhow!("poisoned store"))?;
        Ok(objects.get(key).cloned())
    }
}
