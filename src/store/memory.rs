use crate::core::cache::{CacheEntry, KeyValueCollection};
use crate::core::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory collection, lost when the process exits.
#[derive(Default)]
pub struct MemoryCollection {
    inner: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let cache = self.inner.lock().await;
        let entry = cache.get(key).cloned();
        if entry.is_some() {
            debug!("Cache HIT for key: {}", key);
        } else {
            debug!("Cache MISS for key: {}", key);
        }
        Ok(entry)
    }

    async fn put(&self, key: &str, entry: CacheEntry) -> Result<()> {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {}", key);
        cache.insert(key.to_string(), entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_collection_get_put() {
        let cache = MemoryCollection::new();

        assert!(cache.get("key1").await.unwrap().is_none());

        let entry = CacheEntry::new("payload");
        cache.put("key1", entry.clone()).await.unwrap();
        assert_eq!(cache.get("key1").await.unwrap(), Some(entry));

        assert!(cache.get("key2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_collection_last_write_wins() {
        let cache = MemoryCollection::new();

        cache.put("key1", CacheEntry::new("first")).await.unwrap();
        cache.put("key1", CacheEntry::new("second")).await.unwrap();

        assert_eq!(cache.get("key1").await.unwrap().unwrap().payload, "second");
    }
}
