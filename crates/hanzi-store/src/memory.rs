//! In-process document store
//!
//! Backed by a [`DashMap`] of collections. Each collection is a `BTreeMap`
//! so listing is key-ordered and a patch runs while the shard lock is held.

use crate::document::{Document, DocumentPatch};
use crate::error::{StoreError, StoreResult};
use crate::store::DocumentStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// In-memory [`DocumentStore`]
///
/// Can be switched into an unavailable state to exercise failure paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, BTreeMap<String, Document>>,
    unavailable: AtomicBool,
    reads: AtomicU64,
    writes: AtomicU64,
}

/// Snapshot of store activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Completed read calls (`get`, `list`)
    pub reads: u64,
    /// Completed write calls (`put`, `update`, `delete`, `delete_prefix`)
    pub writes: u64,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of documents in a collection
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, |c| c.len())
    }

    /// Whether a collection holds no documents
    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Activity counters
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
        }
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".to_string()));
        }
        Ok(())
    }

    fn count_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    fn count_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        self.check_available()?;
        self.count_read();
        Ok(self
            .collections
            .get(collection)
            .and_then(|c| c.get(key).cloned()))
    }

    async fn put(&self, collection: &str, key: &str, document: Document) -> StoreResult<()> {
        self.check_available()?;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), document);
        self.count_write();
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        key: &str,
        patch: DocumentPatch,
    ) -> StoreResult<Option<Document>> {
        self.check_available()?;
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(doc) = docs.get_mut(key) else {
            return Ok(None);
        };

        // Patch a copy so a failed patch leaves the stored document untouched
        let mut patched = doc.clone();
        patch.apply(collection, key, &mut patched)?;
        *doc = patched.clone();
        drop(docs);

        self.count_write();
        Ok(Some(patched))
    }

    async fn delete(&self, collection: &str, key: &str) -> StoreResult<bool> {
        self.check_available()?;
        let removed = self
            .collections
            .get_mut(collection)
            .is_some_and(|mut c| c.remove(key).is_some());
        self.count_write();
        Ok(removed)
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<(String, Document)>> {
        self.check_available()?;
        self.count_read();
        Ok(self.collections.get(collection).map_or_else(Vec::new, |c| {
            c.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        }))
    }

    async fn delete_prefix(&self, collection: &str, prefix: &str) -> StoreResult<usize> {
        self.check_available()?;
        let removed = self.collections.get_mut(collection).map_or(0, |mut c| {
            let before = c.len();
            c.retain(|k, _| !k.starts_with(prefix));
            before - c.len()
        });
        self.count_write();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn put_get_delete() {
        let store = MemoryStore::new();
        store.put("c", "a", json!({ "v": 1 })).await.unwrap();

        assert_eq!(store.get("c", "a").await.unwrap(), Some(json!({ "v": 1 })));
        assert_eq!(store.get("c", "missing").await.unwrap(), None);
        assert_eq!(store.get("other", "a").await.unwrap(), None);

        assert!(store.delete("c", "a").await.unwrap());
        assert!(!store.delete("c", "a").await.unwrap());
        assert!(store.is_empty("c"));
    }

    #[tokio::test]
    async fn list_is_key_ordered() {
        let store = MemoryStore::new();
        for key in ["b", "c", "a"] {
            store.put("c", key, json!({})).await.unwrap();
        }
        let keys: Vec<_> = store.list("c").await.unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn update_absent_creates_nothing() {
        let store = MemoryStore::new();
        let patch = DocumentPatch::new().increment("n", 1);
        assert_eq!(store.update("c", "k", patch).await.unwrap(), None);
        assert_eq!(store.len("c"), 0);
    }

    #[tokio::test]
    async fn failed_patch_leaves_document_intact() {
        let store = MemoryStore::new();
        store.put("c", "k", json!({ "n": "text" })).await.unwrap();
        let patch = DocumentPatch::new().set("other", 1).increment("n", 1);
        assert!(store.update("c", "k", patch).await.is_err());
        assert_eq!(store.get("c", "k").await.unwrap(), Some(json!({ "n": "text" })));
    }

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() {
        let store = Arc::new(MemoryStore::new());
        store.put("c", "k", json!({ "n": 0 })).await.unwrap();

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .update("c", "k", DocumentPatch::new().increment("n", 1))
                        .await
                        .unwrap();
                })
            })
            .collect();
        futures::future::join_all(tasks).await;

        assert_eq!(store.get("c", "k").await.unwrap().unwrap()["n"], 50);
    }

    #[tokio::test]
    async fn delete_prefix_is_scoped() {
        let store = MemoryStore::new();
        for key in ["康軒_1_1_1_你", "康軒_1_1_1_我", "康軒_1_1_2_你"] {
            store.put("q", key, json!({})).await.unwrap();
        }
        assert_eq!(store.delete_prefix("q", "康軒_1_1_1_").await.unwrap(), 2);
        assert_eq!(store.len("q"), 1);
        assert_eq!(store.delete_prefix("q", "").await.unwrap(), 1);
        assert!(store.is_empty("q"));
    }

    #[tokio::test]
    async fn unavailable_rejects_everything() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.get("c", "k").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.put("c", "k", json!({})).await.is_err());
        assert_eq!(store.stats(), StoreStats::default());

        store.set_unavailable(false);
        assert!(store.put("c", "k", json!({})).await.is_ok());
        assert_eq!(store.stats().writes, 1);
    }
}
