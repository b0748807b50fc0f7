//! Behaviour every DocumentStore backend must share

use hanzi_store::{DocumentPatch, DocumentStore, JsonFileStore, MemoryStore};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

async fn exercise(store: Arc<dyn DocumentStore>) {
    let tag = store.backend_tag();

    store.put("c", "康軒_1_1_2", json!({ "n": 1 })).await.unwrap();
    store.put("c", "康軒_1_1_1", json!({ "n": 2 })).await.unwrap();
    store.put("c", "翰林_1_1_1", json!({ "n": 3 })).await.unwrap();

    let keys: Vec<_> = store.list("c").await.unwrap().into_iter().map(|(k, _)| k).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted, "{tag}: list must be key-ordered");
    assert_eq!(keys.len(), 3);

    // last write wins
    store.put("c", "康軒_1_1_1", json!({ "n": 20 })).await.unwrap();
    assert_eq!(store.get("c", "康軒_1_1_1").await.unwrap(), Some(json!({ "n": 20 })));

    let patched = store
        .update(
            "c",
            "康軒_1_1_1",
            DocumentPatch::new().increment("n", 5).set("touched", true),
        )
        .await
        .unwrap();
    assert_eq!(patched, Some(json!({ "n": 25, "touched": true })), "{tag}");

    assert_eq!(
        store.update("c", "absent", DocumentPatch::new().increment("n", 1)).await.unwrap(),
        None
    );
    assert_eq!(store.get("c", "absent").await.unwrap(), None, "{tag}: update must not upsert");

    assert_eq!(store.delete_prefix("c", "康軒_").await.unwrap(), 2);
    assert!(store.delete("c", "翰林_1_1_1").await.unwrap());
    assert!(!store.delete("c", "翰林_1_1_1").await.unwrap());
    assert!(store.list("c").await.unwrap().is_empty());
}

async fn concurrent_updates(store: Arc<dyn DocumentStore>) {
    store.put("c", "counter", json!({ "n": 0 })).await.unwrap();
    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .update("c", "counter", DocumentPatch::new().increment("n", 1))
                    .await
                    .unwrap();
            })
        })
        .collect();
    futures::future::join_all(tasks).await;
    assert_eq!(store.get("c", "counter").await.unwrap().unwrap()["n"], 20);
}

#[tokio::test]
async fn memory_store_contract() {
    exercise(Arc::new(MemoryStore::new())).await;
    concurrent_updates(Arc::new(MemoryStore::new())).await;
}

#[tokio::test]
async fn file_store_contract() {
    let dir = tempfile::tempdir().unwrap();
    exercise(Arc::new(JsonFileStore::new(dir.path().join("a")))).await;
    concurrent_updates(Arc::new(JsonFileStore::new(dir.path().join("b")))).await;
}
