//! Catalogue configuration.
//!
//! Configuration is stored as YAML in `config.yaml` and includes:
//! - The remote endpoint (base URL and collection path)
//! - Paging defaults (page size, bulk ceiling for searches)
//! - Cache policy (staleness window, bounded retries)
//! - Search debounce window
//!
//! Every field has a default, so a missing file or a partial file is valid.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CatalogueError, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CATALOGUE_CONFIG";

/// Environment variable overriding `base_url`.
pub const BASE_URL_ENV: &str = "CATALOGUE_BASE_URL";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Collection path under `base_url`
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Page size used when the engine starts (default: 20)
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Ceiling for the single bulk request used by searches (default: 1000)
    #[serde(default = "default_bulk_limit")]
    pub bulk_limit: usize,

    /// Quiescence window for search input in milliseconds (default: 500)
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// How long a cached page stays fresh, in seconds (default: 60)
    #[serde(default = "default_stale_time_secs")]
    pub stale_time_secs: u64,

    /// Extra attempts after a transient failure (default: 1)
    #[serde(default = "default_retry")]
    pub retry: u32,

    /// Backoff base between retries in milliseconds (default: 250)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// HTTP request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://pokeapi.co/api/v2".to_string()
}

fn default_collection() -> String {
    "pokemon".to_string()
}

fn default_limit() -> usize {
    20
}

fn default_bulk_limit() -> usize {
    1000
}

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_stale_time_secs() -> u64 {
    60
}

fn default_retry() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    250
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            collection: default_collection(),
            default_limit: default_limit(),
            bulk_limit: default_bulk_limit(),
            search_debounce_ms: default_search_debounce_ms(),
            stale_time_secs: default_stale_time_secs(),
            retry: default_retry(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    /// Get the path to the config file.
    ///
    /// `CATALOGUE_CONFIG` wins; otherwise the platform config directory is
    /// used, falling back to `./config.yaml` when no home directory exists.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_PATH_ENV)
            && !path.is_empty()
        {
            return PathBuf::from(path);
        }

        directories::ProjectDirs::from("", "", "catalogue")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
            .unwrap_or_else(|| PathBuf::from("config.yaml"))
    }

    /// Load configuration from the default location, or return defaults if
    /// no file exists.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            let mut config = Config::default();
            config.apply_env_overrides();
            config.validate()?;
            return Ok(config);
        }
        Self::load_from(&path)
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CatalogueError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let mut config: Config = serde_yaml_ng::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var(BASE_URL_ENV)
            && !url.is_empty()
        {
            self.base_url = url;
        }
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 {
            return Err(CatalogueError::Config(
                "default_limit must be at least 1".to_string(),
            ));
        }
        if self.bulk_limit == 0 {
            return Err(CatalogueError::Config(
                "bulk_limit must be at least 1".to_string(),
            ));
        }
        Url::parse(&self.base_url).map_err(|e| {
            CatalogueError::Config(format!("invalid base_url '{}': {}", self.base_url, e))
        })?;
        if self.collection.trim_matches('/').is_empty() {
            return Err(CatalogueError::Config(
                "collection must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The collection endpoint, e.g. `https://pokeapi.co/api/v2/pokemon`.
    pub fn collection_url(&self) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.collection.trim_matches('/')
        );
        Url::parse(&joined)
            .map_err(|e| CatalogueError::Config(format!("invalid collection URL '{joined}': {e}")))
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
