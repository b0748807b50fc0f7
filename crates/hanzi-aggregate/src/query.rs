//! Query verdict cache
//!
//! Caches "is each of these characters learned at this position" answers in
//! the `query_cache` collection, keyed by the position plus the query's
//! normalized character set (see [`crate::key`]).
//!
//! A stored entry holds one verdict per *distinct* character. Callers get
//! one verdict per *original* occurrence, so results are re-expanded on
//! every read. Each entry remembers the `lastUpdated` stamp of the
//! cumulative entry it was derived from; if the cumulative entry has been
//! rebuilt since, the stored verdicts are recomputed before being served.

use crate::clock::Clock;
use crate::cumulative::{CumulativeCache, CumulativeCacheEntry};
use crate::error::{AggregationError, AggregationResult};
use crate::key::{normalize_query, query_key, query_prefix};
use chrono::{DateTime, Utc};
use hanzi_curriculum::CurriculumPosition;
use hanzi_store::{decode, encode, DocumentPatch, DocumentStore, StoreError, QUERY_CACHE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Learned verdict for one character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterVerdict {
    /// The queried character
    pub character: String,
    /// Whether it was taught at or before the position
    pub is_learned: bool,
}

/// Stored verdicts for one normalized query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryCacheEntry {
    /// Position queried
    pub position: CurriculumPosition,
    /// Distinct query characters, sorted by code point
    pub query_characters: Vec<String>,
    /// One verdict per entry of `query_characters`, same order
    pub results: Vec<CharacterVerdict>,
    /// Number of times this entry has been served
    pub search_count: u64,
    /// Last time it was served
    pub last_searched: DateTime<Utc>,
    /// First time it was written
    pub created_at: DateTime<Utc>,
    /// `lastUpdated` of the cumulative entry the verdicts came from
    pub derived_from: DateTime<Utc>,
}

impl QueryCacheEntry {
    fn verdicts(&self) -> HashMap<&str, bool> {
        self.results
            .iter()
            .map(|v| (v.character.as_str(), v.is_learned))
            .collect()
    }

    /// Whether the stored verdicts belong to `cumulative`'s position, still
    /// describe it, and cover exactly the characters of `distinct`
    fn is_current(&self, cumulative: &CumulativeCacheEntry, distinct: &[String]) -> bool {
        self.position == cumulative.position
            && self.derived_from == cumulative.last_updated
            && self.query_characters == distinct
            && self
                .results
                .iter()
                .map(|v| &v.character)
                .eq(self.query_characters.iter())
    }
}

/// Answer of one [`QueryCache::get`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    /// One verdict per original input character, in input order
    pub results: Vec<CharacterVerdict>,
    /// `searchCount` after this call
    pub search_count: u64,
    /// Whether stored verdicts were served without recomputation
    pub cache_hit: bool,
    /// Cumulative entry the verdicts are consistent with
    pub cumulative: CumulativeCacheEntry,
}

/// Get-or-build cache of learned verdicts, layered on [`CumulativeCache`]
#[derive(Debug, Clone)]
pub struct QueryCache {
    store: Arc<dyn DocumentStore>,
    cumulative: CumulativeCache,
    clock: Arc<dyn Clock>,
}

impl QueryCache {
    /// Create cache over a backing store and a cumulative cache
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        cumulative: CumulativeCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            cumulative,
            clock,
        }
    }

    /// Underlying cumulative cache
    #[inline]
    #[must_use]
    pub fn cumulative(&self) -> &CumulativeCache {
        &self.cumulative
    }

    /// Verdict for every character of `characters`, in input order
    ///
    /// `characters` must already be validated; duplicates and any order are
    /// fine.
    ///
    /// # Errors
    /// - `AggregationError::EmptyQuery` if `characters` is empty
    /// - `AggregationError::AggregationUnavailable` on store or repository
    ///   failure
    pub async fn get<S: AsRef<str>>(
        &self,
        position: &CurriculumPosition,
        characters: &[S],
    ) -> AggregationResult<QueryOutcome> {
        let distinct = normalize_query(characters);
        if distinct.is_empty() {
            return Err(AggregationError::EmptyQuery);
        }

        let cumulative = self.cumulative.get(position).await?;
        let key = query_key(position, characters);
        let existing = self.load(&key).await?;

        let current = existing.as_ref().filter(|e| e.is_current(&cumulative, &distinct));
        if let Some(entry) = current {
            let served = self.record_hit(&key).await?;
            if let Some(served) = served.filter(|s| s.is_current(&cumulative, &distinct)) {
                tracing::debug!(
                    key = %key,
                    search_count = served.search_count,
                    "query cache hit"
                );
                return Ok(QueryOutcome {
                    results: expand(characters, &served),
                    search_count: served.search_count,
                    cache_hit: true,
                    cumulative,
                });
            }
            // cleared or replaced between read and patch; fall through and rewrite
            tracing::debug!(
                key = %key,
                created_at = %entry.created_at,
                "query entry changed during hit"
            );
        }

        let now = self.clock.now();
        let learned = cumulative.learned();
        let results = distinct
            .iter()
            .map(|c| CharacterVerdict {
                character: c.clone(),
                is_learned: learned.contains(c.as_str()),
            })
            .collect();
        let previous =
            existing.filter(|e| e.position == *position && e.query_characters == distinct);
        let entry = QueryCacheEntry {
            position: position.clone(),
            query_characters: distinct,
            results,
            search_count: previous.as_ref().map_or(1, |e| e.search_count.saturating_add(1)),
            last_searched: now,
            created_at: previous.as_ref().map_or(now, |e| e.created_at),
            derived_from: cumulative.last_updated,
        };

        self.store.put(QUERY_CACHE, &key, encode(&entry)?).await?;
        tracing::info!(
            key = %key,
            recomputed = previous.is_some(),
            learned = entry.results.iter().filter(|v| v.is_learned).count(),
            "stored query verdicts"
        );

        Ok(QueryOutcome {
            results: expand(characters, &entry),
            search_count: entry.search_count,
            cache_hit: false,
            cumulative,
        })
    }

    /// Stored entry for a query without touching counters
    ///
    /// # Errors
    /// Returns `AggregationError::AggregationUnavailable` on store failure
    pub async fn peek<S: AsRef<str>>(
        &self,
        position: &CurriculumPosition,
        characters: &[S],
    ) -> AggregationResult<Option<QueryCacheEntry>> {
        let entry = self.load(&query_key(position, characters)).await?;
        Ok(entry.filter(|e| e.position == *position))
    }

    /// Drop every entry at `position`, or every entry when `None`
    ///
    /// # Errors
    /// Returns `AggregationError::AggregationUnavailable` on store failure
    pub async fn clear(&self, position: Option<&CurriculumPosition>) -> AggregationResult<usize> {
        let removed = match position {
            None => self.store.delete_prefix(QUERY_CACHE, "").await?,
            Some(p) => self.clear_position(p).await?,
        };
        tracing::info!(scope = ?position.map(ToString::to_string), removed, "cleared query cache");
        Ok(removed)
    }

    async fn clear_position(&self, position: &CurriculumPosition) -> Result<usize, StoreError> {
        let prefix = query_prefix(position);
        let mut removed = 0;
        for (key, document) in self.store.list(QUERY_CACHE).await? {
            if !key.starts_with(&prefix) {
                continue;
            }
            // A prefix can also match a publisher whose name ends in "_G_S_L"
            let owned = decode::<QueryCacheEntry>(QUERY_CACHE, &key, document)
                .map_or(true, |e| e.position == *position);
            if owned && self.store.delete(QUERY_CACHE, &key).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn load(&self, key: &str) -> Result<Option<QueryCacheEntry>, StoreError> {
        let document = match self.store.get(QUERY_CACHE, key).await {
            Err(e) if e.is_malformed() => {
                tracing::warn!(key, error = %e, "unreadable query entry, treating as miss");
                return Ok(None);
            }
            other => other?,
        };
        let Some(document) = document else {
            return Ok(None);
        };
        match decode::<QueryCacheEntry>(QUERY_CACHE, key, document) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                tracing::warn!(key, error = %e, "undecodable query entry, treating as miss");
                Ok(None)
            }
        }
    }

    async fn record_hit(&self, key: &str) -> Result<Option<QueryCacheEntry>, StoreError> {
        let now = encode(&self.clock.now())?;
        let patch = DocumentPatch::new()
            .increment("searchCount", 1)
            .set("lastSearched", now);
        self.store
            .update(QUERY_CACHE, key, patch)
            .await?
            .map(|document| decode(QUERY_CACHE, key, document))
            .transpose()
    }
}

/// One verdict per original occurrence
///
/// Every input character has a stored verdict: entries are only served when
/// their character set equals the normalized input.
fn expand<S: AsRef<str>>(characters: &[S], entry: &QueryCacheEntry) -> Vec<CharacterVerdict> {
    let verdicts = entry.verdicts();
    characters
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|c| !c.is_empty())
        .map(|c| CharacterVerdict {
            character: c.to_string(),
            is_learned: verdicts.get(c).copied().unwrap_or(false),
        })
        .collect()
}
