//! Directory-backed document store
//!
//! Layout: `{root}/{collection}/{hex(blake3(key))}.json`, each file holding
//! `{"key": ..., "document": ...}`. File names stay fixed-length whatever the
//! key, and listing recovers keys from file contents. Every write goes through
//! a temp file in the same directory and is persisted with an atomic rename,
//! so readers never observe a half-written document.
//!
//! A file that does not parse is reported as [`StoreError::Malformed`] by
//! `get`, skipped by `list`, and replaced by the next `put` of its key.

use crate::document::{Document, DocumentPatch};
use crate::error::{StoreError, StoreResult};
use crate::store::DocumentStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const EXTENSION: &str = "json";

#[derive(Deserialize)]
struct StoredDocument {
    key: String,
    document: Document,
}

#[derive(Serialize)]
struct StoredDocumentRef<'a> {
    key: &'a str,
    document: &'a Document,
}

/// A file found while scanning a collection directory
struct ScannedFile {
    path: PathBuf,
    /// `None` when the file could not be parsed
    stored: Option<StoredDocument>,
}

/// [`DocumentStore`] persisting each document as a JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    /// Serialises writers so `update` is atomic within the process
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store rooted at `root` (created lazily on first write)
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    /// Path of the file holding `key`
    #[must_use]
    pub fn document_path(&self, collection: &str, key: &str) -> PathBuf {
        let digest = blake3::hash(key.as_bytes());
        self.collection_dir(collection)
            .join(format!("{}.{EXTENSION}", hex::encode(digest.as_bytes())))
    }

    async fn read_document(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        let path = self.document_path(collection, key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io_error(path, e)),
        };
        let stored: StoredDocument = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::malformed(collection, key, e.to_string()))?;
        if stored.key != key {
            return Err(StoreError::malformed(
                collection,
                key,
                format!("file holds key '{}'", stored.key),
            ));
        }
        Ok(Some(stored.document))
    }

    async fn write_document(
        &self,
        collection: &str,
        key: &str,
        document: &Document,
    ) -> StoreResult<()> {
        let dir = self.collection_dir(collection);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io_error(&dir, e))?;

        let bytes = serde_json::to_vec_pretty(&StoredDocumentRef { key, document })?;
        let path = self.document_path(collection, key);
        tokio::task::spawn_blocking(move || persist_atomically(&dir, &path, &bytes))
            .await
            .map_err(|e| StoreError::Unavailable(format!("write task failed: {e}")))?
    }

    async fn scan(&self, collection: &str) -> StoreResult<Vec<ScannedFile>> {
        let dir = self.collection_dir(collection);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io_error(dir, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io_error(&dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                // deleted between listing and reading
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(StoreError::io_error(path, e)),
            };
            let stored = match serde_json::from_slice::<StoredDocument>(&bytes) {
                Ok(stored) => Some(stored),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "skipping unreadable document"
                    );
                    None
                }
            };
            files.push(ScannedFile { path, stored });
        }
        Ok(files)
    }
}

fn persist_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let mut temp =
        tempfile::NamedTempFile::new_in(dir).map_err(|e| StoreError::io_error(dir, e))?;
    temp.write_all(bytes)
        .map_err(|e| StoreError::io_error(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| StoreError::io_error(path, e.error))?;
    Ok(())
}

async fn remove_if_present(path: &Path) -> StoreResult<bool> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StoreError::io_error(path, e)),
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    fn backend_tag(&self) -> &'static str {
        "json-file"
    }

    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        self.read_document(collection, key).await
    }

    async fn put(&self, collection: &str, key: &str, document: Document) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write_document(collection, key, &document).await
    }

    async fn update(
        &self,
        collection: &str,
        key: &str,
        patch: DocumentPatch,
    ) -> StoreResult<Option<Document>> {
        let _guard = self.write_lock.lock().await;
        let Some(mut document) = self.read_document(collection, key).await? else {
            return Ok(None);
        };
        patch.apply(collection, key, &mut document)?;
        self.write_document(collection, key, &document).await?;
        Ok(Some(document))
    }

    async fn delete(&self, collection: &str, key: &str) -> StoreResult<bool> {
        let _guard = self.write_lock.lock().await;
        remove_if_present(&self.document_path(collection, key)).await
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<(String, Document)>> {
        let mut out: Vec<_> = self
            .scan(collection)
            .await?
            .into_iter()
            .filter_map(|file| file.stored)
            .map(|stored| (stored.key, stored.document))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    async fn delete_prefix(&self, collection: &str, prefix: &str) -> StoreResult<usize> {
        let _guard = self.write_lock.lock().await;
        let mut removed = 0;
        for file in self.scan(collection).await? {
            // unreadable files have no key; only a full clear removes them
            let matches = file
                .stored
                .as_ref()
                .map_or(prefix.is_empty(), |stored| stored.key.starts_with(prefix));
            if matches && remove_if_present(&file.path).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
