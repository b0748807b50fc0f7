//! Error types for configuration and process setup

use std::path::PathBuf;

/// Errors while loading configuration or installing logging
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid TOML for this schema
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Log filter directive could not be parsed
    #[error("invalid log filter '{filter}': {message}")]
    InvalidLogFilter {
        /// Directive as configured
        filter: String,
        /// Parser message
        message: String,
    },

    /// A global subscriber was already installed
    #[error("logging already initialised: {0}")]
    LoggingInstalled(String),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
