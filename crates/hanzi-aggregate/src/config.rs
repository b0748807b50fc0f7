//! Cache configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Schema version written into new cumulative entries
pub const CUMULATIVE_SCHEMA_VERSION: u32 = 1;

/// Cache behaviour knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Age after which a cumulative entry is rebuilt; `None` never expires
    pub cumulative_ttl_secs: Option<u64>,
    /// Entries stamped with any other version are rebuilt on read
    pub schema_version: u32,
}

impl CacheConfig {
    /// Create default configuration (no expiry)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With cumulative TTL
    #[inline]
    #[must_use]
    pub fn with_cumulative_ttl(mut self, ttl: Duration) -> Self {
        self.cumulative_ttl_secs = Some(ttl.as_secs());
        self
    }

    /// With schema version
    #[inline]
    #[must_use]
    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = version;
        self
    }

    /// TTL as a duration
    #[inline]
    #[must_use]
    pub fn cumulative_ttl(&self) -> Option<Duration> {
        self.cumulative_ttl_secs.map(Duration::from_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cumulative_ttl_secs: None,
            schema_version: CUMULATIVE_SCHEMA_VERSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_never_expires() {
        let config = CacheConfig::default();
        assert_eq!(config.cumulative_ttl(), None);
        assert_eq!(config.schema_version, CUMULATIVE_SCHEMA_VERSION);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: CacheConfig = serde_json::from_str(r#"{"cumulative_ttl_secs": 60}"#).unwrap();
        assert_eq!(config.cumulative_ttl(), Some(Duration::from_secs(60)));
        assert_eq!(config.schema_version, CUMULATIVE_SCHEMA_VERSION);
    }
}
