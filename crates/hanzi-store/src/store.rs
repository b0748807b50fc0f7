//! Document store abstraction
//!
//! Caches and repositories never talk to a concrete backend; they hold an
//! `Arc<dyn DocumentStore>` so tests can substitute [`MemoryStore`] for a
//! remote store.
//!
//! [`MemoryStore`]: crate::MemoryStore

use crate::document::{Document, DocumentPatch};
use crate::error::StoreResult;
use async_trait::async_trait;
use std::fmt::Debug;

/// Collection holding lesson documents
pub const LESSONS: &str = "lessons";

/// Collection holding cumulative vocabulary entries
pub const CUMULATIVE_CACHE: &str = "cumulative_cache";

/// Collection holding query verdict entries
pub const QUERY_CACHE: &str = "query_cache";

/// Key-value document store organised in named collections
///
/// Writes are last-write-wins per document. [`DocumentStore::update`] is the
/// only read-modify-write primitive and must be atomic per document.
#[async_trait]
pub trait DocumentStore: Send + Sync + Debug {
    /// Short backend name for logs
    fn backend_tag(&self) -> &'static str;

    /// Fetch one document
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>>;

    /// Create or replace one document
    async fn put(&self, collection: &str, key: &str, document: Document) -> StoreResult<()>;

    /// Patch an existing document atomically, returning the patched document
    ///
    /// Returns `Ok(None)` without creating anything if the key is absent.
    async fn update(
        &self,
        collection: &str,
        key: &str,
        patch: DocumentPatch,
    ) -> StoreResult<Option<Document>>;

    /// Remove one document, reporting whether it existed
    async fn delete(&self, collection: &str, key: &str) -> StoreResult<bool>;

    /// Every document of a collection, ordered by key
    async fn list(&self, collection: &str) -> StoreResult<Vec<(String, Document)>>;

    /// Remove every document whose key starts with `prefix`
    ///
    /// An empty prefix clears the collection. Returns the number removed.
    async fn delete_prefix(&self, collection: &str, prefix: &str) -> StoreResult<usize>;
}
