//! Hanzi Aggregate
//!
//! Computes the cumulative vocabulary a learner should know at a curriculum
//! position and caches it in two tiers.
//!
//! # Architecture
//!
//! ```text
//! QueryCache ──miss──► CumulativeCache ──miss/stale──► CumulativeSetBuilder
//!     │                      │                               ▲
//!     ▼                      ▼                               │
//! query_cache/         cumulative_cache/             LessonRepository
//! ```
//!
//! Both caches persist through an injected [`hanzi_store::DocumentStore`];
//! neither keeps state of its own between calls.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod builder;
pub mod clock;
pub mod config;
pub mod cumulative;
pub mod error;
pub mod key;
pub mod query;

pub use builder::{CumulativeSet, CumulativeSetBuilder, LearnedCharacter};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, CUMULATIVE_SCHEMA_VERSION};
pub use cumulative::{course_range, CumulativeCache, CumulativeCacheEntry};
pub use error::{AggregationError, AggregationResult};
pub use key::{normalize_query, position_key, query_key};
pub use query::{CharacterVerdict, QueryCache, QueryCacheEntry, QueryOutcome};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
