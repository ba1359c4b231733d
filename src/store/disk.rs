use crate::core::cache::{CacheEntry, KeyValueCollection};
use crate::core::error::{FundError, Result};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use tracing::debug;

/// A namespace backed by one fjall partition.
pub struct DiskCollection {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Keyspace, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let operation = || format!("cache read of '{key}'");
        let Some(bytes) = self
            .partition
            .get(key)
            .map_err(|e| FundError::storage(operation(), e))?
        else {
            debug!("Cache MISS for key: {}", key);
            return Ok(None);
        };

        let entry: CacheEntry = serde_json::from_slice(&bytes)
            .map_err(|e| FundError::storage(operation(), format!("corrupt cache entry: {e}")))?;
        debug!("Cache HIT for key: {}", key);
        Ok(Some(entry))
    }

    async fn put(&self, key: &str, entry: CacheEntry) -> Result<()> {
        let operation = || format!("cache write of '{key}'");
        let bytes = serde_json::to_vec(&entry).map_err(|e| FundError::storage(operation(), e))?;
        self.partition
            .insert(key, bytes)
            .map_err(|e| FundError::storage(operation(), e))?;
        self.keyspace
            .persist(PersistMode::SyncAll)
            .map_err(|e| FundError::storage(operation(), e))?;
        debug!("Cache PUT for key: {}", key);
        Ok(())
    }
}
