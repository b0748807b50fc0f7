//! Cumulative vocabulary cache
//!
//! Read-through cache in front of [`CumulativeSetBuilder`], one document per
//! curriculum position in the `cumulative_cache` collection.
//!
//! # Lifecycle
//!
//! - created lazily on the first read at a position
//! - rebuilt when older than the configured TTL, when written under another
//!   schema version, or when the stored document cannot be decoded
//! - removed only by [`CumulativeCache::clear`]
//!
//! Rebuilds run on a spawned task. A caller that stops waiting does not
//! cancel the rebuild; its result is still persisted for the next reader.

use crate::builder::{CumulativeSetBuilder, LearnedCharacter};
use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::error::{AggregationError, AggregationResult};
use crate::key::position_key;
use chrono::{DateTime, Utc};
use hanzi_curriculum::CurriculumPosition;
use hanzi_store::{
    decode, encode, DocumentStore, LessonRepository, StoreError, CUMULATIVE_CACHE,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Stored cumulative vocabulary at one position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativeCacheEntry {
    /// Position this entry describes
    pub position: CurriculumPosition,
    /// Learned characters in first-appearance order
    pub characters: Vec<LearnedCharacter>,
    /// `characters.len()`
    pub total_count: usize,
    /// Human-readable span of lessons covered
    pub course_range: String,
    /// When this entry was built
    pub last_updated: DateTime<Utc>,
    /// Schema version of this document
    pub version: u32,
}

impl CumulativeCacheEntry {
    /// Distinct learned characters for membership tests
    #[must_use]
    pub fn learned(&self) -> HashSet<&str> {
        self.characters.iter().map(|c| c.character.as_str()).collect()
    }

    /// Whether `character` has been taught by this position
    #[must_use]
    pub fn contains(&self, character: &str) -> bool {
        self.characters.iter().any(|c| c.character == character)
    }

    /// Learned characters only, in first-appearance order
    pub fn character_list(&self) -> impl Iterator<Item = &str> {
        self.characters.iter().map(|c| c.character.as_str())
    }
}

/// `"{publisher} 1-1-1 ~ {grade}-{semester}-{lesson}"`
#[must_use]
pub fn course_range(position: &CurriculumPosition) -> String {
    format!("{} 1-1-1 ~ {}", position.publisher(), position.label())
}

/// Get-or-build cache keyed by [`CurriculumPosition`]
#[derive(Debug, Clone)]
pub struct CumulativeCache {
    store: Arc<dyn DocumentStore>,
    lessons: Arc<dyn LessonRepository>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
}

impl CumulativeCache {
    /// Create cache over a backing store and lesson source
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        lessons: Arc<dyn LessonRepository>,
        clock: Arc<dyn Clock>,
        config: CacheConfig,
    ) -> Self {
        Self {
            store,
            lessons,
            clock,
            config,
        }
    }

    /// Cache configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Cumulative vocabulary at `position`, rebuilding if missing or stale
    ///
    /// # Errors
    /// - `AggregationError::AggregationUnavailable` if the store or lesson
    ///   repository fails; nothing is written in that case
    /// - builder errors for malformed lesson data
    pub async fn get(
        &self,
        position: &CurriculumPosition,
    ) -> AggregationResult<CumulativeCacheEntry> {
        let key = position_key(position);

        if let Some(entry) = self.fresh_entry(&key, position).await? {
            tracing::debug!(key = %key, count = entry.total_count, "cumulative cache hit");
            return Ok(entry);
        }

        let this = self.clone();
        let target = position.clone();
        tokio::spawn(async move { this.rebuild(&target).await })
            .await
            .map_err(|e| AggregationError::RebuildAborted(e.to_string()))?
    }

    /// Stored entry at `position` without rebuilding, fresh or not
    ///
    /// # Errors
    /// Returns `AggregationError::AggregationUnavailable` on store failure
    pub async fn peek(
        &self,
        position: &CurriculumPosition,
    ) -> AggregationResult<Option<CumulativeCacheEntry>> {
        let entry = self.load(&position_key(position)).await?;
        Ok(entry.filter(|e| e.position == *position))
    }

    /// Drop the entry at `position`, or every entry when `None`
    ///
    /// # Errors
    /// Returns `AggregationError::AggregationUnavailable` on store failure
    pub async fn clear(&self, position: Option<&CurriculumPosition>) -> AggregationResult<usize> {
        let removed = match position {
            Some(p) => self.clear_position(p).await?,
            None => self.store.delete_prefix(CUMULATIVE_CACHE, "").await?,
        };
        tracing::info!(
            scope = ?position.map(ToString::to_string),
            removed,
            "cleared cumulative cache"
        );
        Ok(removed)
    }

    async fn clear_position(&self, position: &CurriculumPosition) -> Result<usize, StoreError> {
        let key = position_key(position);
        // a case-folded key may currently hold another publisher's entry
        if let Some(entry) = self.load(&key).await? {
            if entry.position != *position {
                return Ok(0);
            }
        }
        Ok(usize::from(self.store.delete(CUMULATIVE_CACHE, &key).await?))
    }

    async fn load(&self, key: &str) -> Result<Option<CumulativeCacheEntry>, StoreError> {
        let document = match self.store.get(CUMULATIVE_CACHE, key).await {
            Err(e) if e.is_malformed() => {
                tracing::warn!(key, error = %e, "unreadable cumulative entry, treating as miss");
                return Ok(None);
            }
            other => other?,
        };
        let Some(document) = document else {
            return Ok(None);
        };
        match decode::<CumulativeCacheEntry>(CUMULATIVE_CACHE, key, document) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                tracing::warn!(key, error = %e, "undecodable cumulative entry, treating as miss");
                Ok(None)
            }
        }
    }

    async fn fresh_entry(
        &self,
        key: &str,
        position: &CurriculumPosition,
    ) -> AggregationResult<Option<CumulativeCacheEntry>> {
        let Some(entry) = self.load(key).await? else {
            return Ok(None);
        };
        // keys are case-folded, so "Kang" and "KANG" share a document
        if entry.position != *position {
            tracing::debug!(
                key,
                stored = %entry.position,
                requested = %position,
                "cumulative entry owned by another position"
            );
            return Ok(None);
        }
        if entry.version != self.config.schema_version {
            tracing::info!(
                key,
                found = entry.version,
                expected = self.config.schema_version,
                "schema version changed"
            );
            return Ok(None);
        }
        if self.is_expired(&entry) {
            tracing::debug!(key, last_updated = %entry.last_updated, "cumulative entry expired");
            return Ok(None);
        }
        Ok(Some(entry))
    }

    fn is_expired(&self, entry: &CumulativeCacheEntry) -> bool {
        let Some(ttl) = self.config.cumulative_ttl() else {
            return false;
        };
        // negative age (clock skew) counts as fresh
        (self.clock.now() - entry.last_updated)
            .to_std()
            .is_ok_and(|age| age > ttl)
    }

    async fn rebuild(
        &self,
        position: &CurriculumPosition,
    ) -> AggregationResult<CumulativeCacheEntry> {
        let key = position_key(position);
        let lessons = self.lessons.list_lessons(position.publisher()).await.map_err(|e| {
            tracing::warn!(key = %key, error = %e, "lesson repository unavailable");
            AggregationError::from(e)
        })?;

        let set = CumulativeSetBuilder.build(&lessons, position)?;
        let characters = set.into_learned();
        let entry = CumulativeCacheEntry {
            position: position.clone(),
            total_count: characters.len(),
            characters,
            course_range: course_range(position),
            last_updated: self.clock.now(),
            version: self.config.schema_version,
        };

        self.store.put(CUMULATIVE_CACHE, &key, encode(&entry)?).await?;
        tracing::info!(
            key = %key,
            lessons = lessons.len(),
            count = entry.total_count,
            "rebuilt cumulative vocabulary"
        );
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_range_spans_from_first_lesson() {
        let p = CurriculumPosition::new("康軒", 2, 1, 5).unwrap();
        assert_eq!(course_range(&p), "康軒 1-1-1 ~ 2-1-5");
    }

    #[test]
    fn entry_serializes_with_document_field_names() {
        let p = CurriculumPosition::new("康軒", 1, 1, 1).unwrap();
        let entry = CumulativeCacheEntry {
            position: p.clone(),
            characters: vec![LearnedCharacter {
                character: "你".to_string(),
                first_appearance: p.clone(),
            }],
            total_count: 1,
            course_range: course_range(&p),
            last_updated: DateTime::<Utc>::UNIX_EPOCH,
            version: 1,
        };
        let json = serde_json::to_value(&entry).unwrap();
        for field in ["characters", "totalCount", "courseRange", "lastUpdated", "version"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
        assert!(entry.contains("你"));
        assert!(entry.learned().contains("你"));
    }
}
