//! Generic documents and atomic field patches

use crate::error::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A stored document (always a JSON object in practice)
pub type Document = Value;

/// Field-level changes applied to one document as a single atomic step
///
/// Backends that can apply a patch under a per-document lock use this for
/// counters that would otherwise lose updates under read-modify-write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    increments: Vec<(String, i64)>,
    sets: Vec<(String, Value)>,
}

impl DocumentPatch {
    /// Empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `by` to an integer field (missing fields start at 0)
    #[inline]
    #[must_use]
    pub fn increment(mut self, field: impl Into<String>, by: i64) -> Self {
        self.increments.push((field.into(), by));
        self
    }

    /// Overwrite a field
    #[inline]
    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.sets.push((field.into(), value.into()));
        self
    }

    /// Whether the patch changes nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.increments.is_empty() && self.sets.is_empty()
    }

    /// Apply to a document in place
    ///
    /// # Errors
    /// Returns `StoreError::Malformed` if the document is not an object or an
    /// incremented field is not an integer
    pub fn apply(&self, collection: &str, key: &str, document: &mut Document) -> StoreResult<()> {
        let Some(fields) = document.as_object_mut() else {
            return Err(StoreError::malformed(collection, key, "document is not an object"));
        };

        for (field, by) in &self.increments {
            let current = match fields.get(field) {
                None | Some(Value::Null) => 0,
                Some(v) => v.as_i64().ok_or_else(|| {
                    let reason = format!("field '{field}' is not an integer");
                    StoreError::malformed(collection, key, reason)
                })?,
            };
            fields.insert(field.clone(), Value::from(current.saturating_add(*by)));
        }

        for (field, value) in &self.sets {
            fields.insert(field.clone(), value.clone());
        }

        Ok(())
    }
}

/// Serialize a typed value into a document
///
/// # Errors
/// Returns `StoreError::Serialization` if serialization fails
pub fn encode<T: Serialize>(value: &T) -> StoreResult<Document> {
    Ok(serde_json::to_value(value)?)
}

/// Deserialize a document into a typed value
///
/// # Errors
/// Returns `StoreError::Malformed` naming the offending document
pub fn decode<T: DeserializeOwned>(
    collection: &str,
    key: &str,
    document: Document,
) -> StoreResult<T> {
    serde_json::from_value(document)
        .map_err(|e| StoreError::malformed(collection, key, e.to_string()))
}
