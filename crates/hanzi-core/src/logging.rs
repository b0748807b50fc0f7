//! Process-wide tracing subscriber

use crate::config::LogConfig;
use crate::error::{ConfigError, ConfigResult};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber writing to stderr
///
/// `RUST_LOG` wins over the configured filter when set.
///
/// # Errors
/// - `ConfigError::InvalidLogFilter` if the configured directive is invalid
/// - `ConfigError::LoggingInstalled` if a global subscriber already exists
pub fn init(config: &LogConfig) -> ConfigResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.filter).map_err(|e| ConfigError::InvalidLogFilter {
            filter: config.filter.clone(),
            message: e.to_string(),
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| ConfigError::LoggingInstalled(e.to_string()))
}
