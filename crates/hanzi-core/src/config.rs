//! Ledger configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! [store]
//! kind = "file"
//! root = "/var/lib/hanzi-ledger"
//!
//! [cache]
//! cumulative_ttl_secs = 86400
//!
//! [log]
//! filter = "hanzi_aggregate=debug,info"
//! json = true
//! ```

use crate::error::{ConfigError, ConfigResult};
use hanzi_aggregate::CacheConfig;
use hanzi_store::{DocumentStore, JsonFileStore, MemoryStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Store root used by the CLI when no configuration file is given
pub const DEFAULT_DATA_DIR: &str = "hanzi-ledger-data";

/// Backing store selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Process-local, lost on exit
    #[default]
    Memory,
    /// JSON documents under a directory
    File {
        /// Store root directory
        root: PathBuf,
    },
}

impl StoreConfig {
    /// Open the configured store
    #[must_use]
    pub fn open(&self) -> Arc<dyn DocumentStore> {
        match self {
            Self::Memory => Arc::new(MemoryStore::new()),
            Self::File { root } => Arc::new(JsonFileStore::new(root.clone())),
        }
    }
}

/// Logging options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Where documents live
    pub store: StoreConfig,
    /// Cache behaviour
    pub cache: CacheConfig,
    /// Logging
    pub log: LogConfig,
}

impl LedgerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With store selection
    #[inline]
    #[must_use]
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    /// With cache configuration
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// With log configuration
    #[inline]
    #[must_use]
    pub fn with_log(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` for invalid TOML or unknown store kinds
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` for invalid content
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Read `path` if given, else a file store under [`DEFAULT_DATA_DIR`]
    ///
    /// # Errors
    /// Same as [`LedgerConfig::from_file`]
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default().with_store(StoreConfig::File {
                root: PathBuf::from(DEFAULT_DATA_DIR),
            })),
        }
    }
}
