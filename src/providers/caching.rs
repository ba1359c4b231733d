use crate::core::cache::{Cache, CacheEntry, KeyValueCollection};
use crate::core::config::StorageErrorPolicy;
use crate::core::error::{FundError, Result};
use crate::core::fund::{FundDirectory, NavProvider, Page};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

pub const FUND_DIRECTORY_KEY: &str = "fund-directory";

/// Escapes the key separator so distinct fund ids never produce the same key.
fn escape_component(component: &str) -> String {
    component.replace('%', "%25").replace(':', "%3A")
}

pub fn net_value_page_key(fund_id: &str, page_number: u32, page_size: usize) -> String {
    format!(
        "net-values:{}:page:{page_number}:size:{page_size}",
        escape_component(fund_id)
    )
}

/// Puts a key-value collection in front of a [`NavProvider`].
///
/// Successful results are written to the collection on every miss and
/// memoized in-process, so one run never repeats a network call for the same
/// request. Errors from the inner provider are not cached.
pub struct CachingNavProvider<P: NavProvider> {
    inner: P,
    collection: Arc<dyn KeyValueCollection>,
    memo: Cache<String, String>,
    policy: StorageErrorPolicy,
    max_age: Option<chrono::Duration>,
}

impl<P: NavProvider> CachingNavProvider<P> {
    pub fn new(inner: P, collection: Arc<dyn KeyValueCollection>) -> Self {
        Self {
            inner,
            collection,
            memo: Cache::new(),
            policy: StorageErrorPolicy::Fail,
            max_age: None,
        }
    }

    pub fn with_storage_error_policy(mut self, policy: StorageErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Entries older than `max_age` are refetched instead of served.
    pub fn with_max_age(mut self, max_age: Option<chrono::Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    fn tolerate(&self, err: FundError) -> Result<()> {
        match self.policy {
            StorageErrorPolicy::Fail => Err(err),
            StorageErrorPolicy::Miss => {
                warn!(error = %err, "Ignoring cache storage failure");
                Ok(())
            }
        }
    }

    async fn read_stored<T: DeserializeOwned>(&self, key: &str) -> Result<Option<(String, T)>> {
        let entry = match self.collection.get(key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return Ok(None),
            Err(e) => return self.tolerate(e).map(|_| None),
        };

        if let Some(max_age) = self.max_age
            && entry.is_stale(max_age, Utc::now())
        {
            debug!("Cache entry stale for key: {}", key);
            return Ok(None);
        }

        match serde_json::from_str(&entry.payload) {
            Ok(value) => Ok(Some((entry.payload, value))),
            Err(e) => self
                .tolerate(FundError::storage(
                    format!("cache read of '{key}'"),
                    format!("corrupt cache entry: {e}"),
                ))
                .map(|_| None),
        }
    }

    async fn cached<T, F, Fut>(&self, key: String, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        if let Some(payload) = self.memo.get(&key).await {
            return serde_json::from_str(&payload)
                .map_err(|e| FundError::storage(format!("memo read of '{key}'"), e));
        }

        if let Some((payload, value)) = self.read_stored(&key).await? {
            self.memo.put(key, payload).await;
            return Ok(value);
        }

        debug!("Fetching from provider for key: {}", key);
        let value = fetch().await?;
        let payload = serde_json::to_string(&value)
            .map_err(|e| FundError::storage(format!("cache write of '{key}'"), e))?;

        if let Err(e) = self
            .collection
            .put(&key, CacheEntry::new(payload.clone()))
            .await
        {
            self.tolerate(e)?;
        }
        self.memo.put(key, payload).await;
        Ok(value)
    }
}

#[async_trait]
impl<P: NavProvider> NavProvider for CachingNavProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn page_size(&self) -> usize {
        self.inner.page_size()
    }

    async fn fetch_fund_directory(&self) -> Result<FundDirectory> {
        self.cached(FUND_DIRECTORY_KEY.to_string(), || {
            self.inner.fetch_fund_directory()
        })
        .await
    }

    async fn fetch_net_value_page(&self, fund_id: &str, page_number: u32) -> Result<Page> {
        let key = net_value_page_key(fund_id, page_number, self.inner.page_size());
        self.cached(key, || self.inner.fetch_net_value_page(fund_id, page_number))
            .await
    }
}
