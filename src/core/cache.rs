use crate::core::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Process-local memo of values, shared between clones.
#[derive(Clone)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let cache = self.inner.lock().await;
        let value = cache.get(key).cloned();
        if value.is_some() {
            debug!("Memo HIT");
        } else {
            debug!("Memo MISS");
        }
        value
    }

    pub async fn put(&self, key: K, value: V) {
        let mut cache = self.inner.lock().await;
        debug!("Memo PUT");
        cache.insert(key, value);
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

/// A stored payload and the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub payload: String,
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            stored_at: Utc::now(),
        }
    }

    /// An entry is stale once it is older than `max_age`.
    pub fn is_stale(&self, max_age: chrono::Duration, now: DateTime<Utc>) -> bool {
        now - self.stored_at > max_age
    }
}

/// Key-value persistence scoped to one namespace.
///
/// `get` on a key never written is `Ok(None)`. `put` replaces whatever was
/// stored under the key. I/O faults are returned as errors, never as misses.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    async fn put(&self, key: &str, entry: CacheEntry) -> Result<()>;
}

/// Hands out one collection per namespace.
pub trait Store: Send + Sync {
    fn get_collection(&self, name: &str, persist: bool) -> Result<Arc<dyn KeyValueCollection>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = Cache::<String, i32>::new();

        // Initially, cache is empty
        assert!(cache.get(&"key1".to_string()).await.is_none());

        cache.put("key1".to_string(), 123).await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        assert!(cache.get(&"key2".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_cache_clones_share_state() {
        let cache = Cache::<String, i32>::new();
        let clone = cache.clone();

        clone.put("key1".to_string(), 7).await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(7));
    }

    #[test]
    fn test_cache_entry_staleness() {
        let entry = CacheEntry::new("{}");
        let max_age = chrono::Duration::hours(1);

        assert!(!entry.is_stale(max_age, entry.stored_at + chrono::Duration::minutes(59)));
        assert!(entry.is_stale(max_age, entry.stored_at + chrono::Duration::minutes(61)));
    }
}
