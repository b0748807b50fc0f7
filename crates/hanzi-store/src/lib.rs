//! Hanzi Store
//!
//! Storage seam for the ledger. Higher layers depend only on the
//! [`DocumentStore`] and [`LessonRepository`] traits.
//!
//! # Backends
//!
//! - [`MemoryStore`]: concurrent in-process map, used by tests and embedding
//! - [`JsonFileStore`]: one JSON file per document under a root directory
//!
//! # Persisted layout
//!
//! ```text
//! lessons/           {publisher}_{grade}_{semester}_{lesson}
//! cumulative_cache/  {publisher}_{grade}_{semester}_{lesson}            (lower-cased)
//! query_cache/       {publisher}_{grade}_{semester}_{lesson}_{chars}    (lower-cased)
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod document;
pub mod error;
pub mod file;
pub mod lessons;
pub mod memory;
pub mod store;

pub use document::{decode, encode, Document, DocumentPatch};
pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use lessons::{adapt_lesson, LessonRepository, StoreLessonRepository};
pub use memory::{MemoryStore, StoreStats};
pub use store::{DocumentStore, CUMULATIVE_CACHE, LESSONS, QUERY_CACHE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
