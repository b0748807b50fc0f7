//! Hanzi Ledger Core
//!
//! Wires the curriculum model, the document store and the two cache tiers
//! into one service, and carries the process concerns around it.
//!
//! ## Architecture
//!
//! ```text
//! AggregationService
//!   └── QueryCache          query_cache/{position}_{chars}
//!         └── CumulativeCache   cumulative_cache/{position}
//!               └── LessonRepository  lessons/{publisher}_{g}_{s}_{l}
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use hanzi_core::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = LedgerConfig::from_file("ledger.toml")?;
//! let service = AggregationService::from_store(config.store.open(), config.cache);
//! let position = CurriculumPosition::new("康軒", 1, 1, 2)?;
//! let result = service.query_learned_status("康軒", &position, "你我他").await?;
//! println!("{}/{} learned", result.total_learned, result.total_queried);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod logging;
pub mod service;

pub use config::{LedgerConfig, LogConfig, StoreConfig, DEFAULT_DATA_DIR};
pub use error::{ConfigError, ConfigResult};
pub use service::{AggregationService, QueryResult};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::config::{LedgerConfig, LogConfig, StoreConfig};
    pub use crate::error::{ConfigError, ConfigResult};
    pub use crate::service::{AggregationService, QueryResult};
    pub use hanzi_aggregate::{AggregationError, AggregationResult, CacheConfig, CharacterVerdict};
    pub use hanzi_curriculum::{CurriculumPosition, LessonRecord};
    pub use hanzi_store::{DocumentStore, JsonFileStore, MemoryStore};
}
