pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::{FundError, NavProvider};
use crate::core::cache::Store;
use crate::core::config::{AppConfig, StorageErrorPolicy};
use crate::providers::{CachingNavProvider, EastMoneyProvider};
use crate::store::KeyValueStore;
use anyhow::Result;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Max, min and average net value over the last `num_days` trading days.
    Statistics { fund_id: String, num_days: i64 },
}

/// Builds the cache-backed East Money provider described by `config`.
pub fn build_provider(config: &AppConfig) -> Result<CachingNavProvider<EastMoneyProvider>> {
    let remote = EastMoneyProvider::new(&config.east_money())?;

    let mut persist = config.cache.persist;
    let store = if persist {
        let cache_dir = config.default_data_path()?.join("cache");
        match KeyValueStore::open(&cache_dir) {
            Ok(store) => store,
            Err(e) if config.cache.on_storage_error == StorageErrorPolicy::Miss => {
                warn!(error = %e, "Cache store unavailable, continuing without persistence");
                persist = false;
                KeyValueStore::in_memory()
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        KeyValueStore::in_memory()
    };
    let collection = store.get_collection(remote.name(), persist)?;

    Ok(CachingNavProvider::new(remote, collection)
        .with_storage_error_policy(config.cache.on_storage_error)
        .with_max_age(config.cache.max_age()))
}

/// True when `err` came from a provider call that may succeed on a later run.
pub fn is_transient_failure(err: &anyhow::Error) -> bool {
    err.downcast_ref::<FundError>()
        .is_some_and(FundError::is_retryable)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("navstat starting...");

    match command {
        AppCommand::Statistics { fund_id, num_days } => {
            // Reject bad requests before touching config, disk or network
            core::window::validate_request(&fund_id, num_days)?;

            let config = match config_path {
                Some(path) => AppConfig::load_from_path(path)?,
                None => AppConfig::load()?,
            };
            debug!("Loaded config: {config:#?}");

            let provider = build_provider(&config)?;
            cli::statistics::run(provider, &fund_id, num_days).await
        }
    }
}
