pub mod disk;
pub mod memory;

use crate::core::cache::{KeyValueCollection, Store};
use crate::core::error::{FundError, Result};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};
use tracing::debug;

/// A thread-safe key-value store that can hold multiple namespaced collections.
///
/// Each namespace maps to its own fjall partition, so keys in different
/// namespaces never collide. Two processes writing the same key race with
/// last-write-wins semantics; there is no cross-process lock.
pub struct KeyValueStore {
    collections: RwLock<HashMap<(String, bool), Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Keyspace>,
}

impl KeyValueStore {
    /// Opens (or creates) a disk-backed store rooted at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .map_err(|e| FundError::storage(format!("create {}", path.display()), e))?;
        let keyspace = fjall::Config::new(path)
            .open()
            .map_err(|e| FundError::storage(format!("open {}", path.display()), e))?;
        debug!("Opened cache store at {}", path.display());

        Ok(Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: Some(keyspace),
        })
    }

    /// A store that can only hand out non-persistent collections.
    pub fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    fn validate_name(name: &str) -> Result<()> {
        let valid = !name.is_empty()
            && name.len() <= 512
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(())
        } else {
            Err(FundError::InvalidInput(format!(
                "invalid cache namespace: '{name}'"
            )))
        }
    }

    fn create_collection(&self, name: &str, persist: bool) -> Result<Arc<dyn KeyValueCollection>> {
        if !persist {
            return Ok(Arc::new(MemoryCollection::new()));
        }

        let keyspace = self.keyspace.as_ref().ok_or_else(|| {
            FundError::storage(
                format!("open namespace '{name}'"),
                "store has no backing directory",
            )
        })?;
        let partition = keyspace
            .open_partition(name, PartitionCreateOptions::default())
            .map_err(|e| FundError::storage(format!("open namespace '{name}'"), e))?;
        Ok(Arc::new(DiskCollection::new(keyspace.clone(), partition)))
    }
}

impl Store for KeyValueStore {
    fn get_collection(&self, name: &str, persist: bool) -> Result<Arc<dyn KeyValueCollection>> {
        Self::validate_name(name)?;
        let key = (name.to_string(), persist);

        if let Some(collection) = self
            .collections
            .read()
            .map_err(|e| FundError::storage("read collections", e))?
            .get(&key)
        {
            return Ok(Arc::clone(collection));
        }

        let mut collections = self
            .collections
            .write()
            .map_err(|e| FundError::storage("write collections", e))?;
        if let Some(collection) = collections.get(&key) {
            return Ok(Arc::clone(collection));
        }
        let collection = self.create_collection(name, persist)?;
        collections.insert(key, Arc::clone(&collection));
        Ok(collection)
    }
}
