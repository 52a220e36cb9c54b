use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Durable key/value cache holding JSON-serialized `BlockchainData`.
///
/// Keys are the lower-cased `eip721:{chain}:{contract}:{tokenID}` strings.
/// Entries are write-once by convention: callers check `get` before `put`
/// and never overwrite an existing value. No mutual exclusion is provided;
/// concurrent writers for the same key produce identical values.
#[async_trait]
pub trait DataCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;
}

/// Object store holding rendered preview bytes plus custom metadata.
///
/// Existence of a key (via `head`) is the sole source of truth for
/// "already rendered"; no separate index exists.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn head(&self, key: &str) -> Result<bool>;
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        custom_metadata: HashMap<String, String>,
    ) -> Result<()>;
    async fn get(&self, key: &str) -> Result<Option<StoredObject>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub custom_metadata: HashMap<String, String>,
}
