use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_FUND_LIST_URL: &str = "http://fund.eastmoney.com/js/fundcode_search.js";
pub const DEFAULT_API_BASE_URL: &str = "http://api.fund.eastmoney.com";
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EastMoneyProviderConfig {
    #[serde(default = "default_fund_list_url")]
    pub fund_list_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_fund_list_url() -> String {
    DEFAULT_FUND_LIST_URL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for EastMoneyProviderConfig {
    fn default() -> Self {
        Self {
            fund_list_url: default_fund_list_url(),
            api_base_url: default_api_base_url(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub east_money: Option<EastMoneyProviderConfig>,
}

/// What the cached provider does when the cache store itself fails.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageErrorPolicy {
    /// Propagate the storage failure to the caller.
    #[default]
    Fail,
    /// Log the failure and continue as if the entry were absent.
    Miss,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CacheConfig {
    #[serde(default = "default_persist")]
    pub persist: bool,
    #[serde(default)]
    pub on_storage_error: StorageErrorPolicy,
    #[serde(default)]
    pub max_age_hours: Option<u64>,
}

fn default_persist() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            persist: true,
            on_storage_error: StorageErrorPolicy::default(),
            max_age_hours: None,
        }
    }
}

impl CacheConfig {
    pub fn max_age(&self) -> Option<chrono::Duration> {
        self.max_age_hours
            .and_then(|hours| i64::try_from(hours).ok())
            .and_then(chrono::Duration::try_hours)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults when it does not exist.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "navstat", "navstat")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "navstat", "navstat")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn east_money(&self) -> EastMoneyProviderConfig {
        self.providers.east_money.clone().unwrap_or_default()
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
