//! Learned-status service
//!
//! Callers hand in free text; only CJK ideographs are checked, one verdict per
//! occurrence in input order.

use hanzi_aggregate::{
    AggregationError, AggregationResult, CacheConfig, CharacterVerdict, Clock, CumulativeCache,
    CumulativeCacheEntry, QueryCache, SystemClock,
};
use hanzi_curriculum::text::ideographs;
use hanzi_curriculum::{CurriculumPosition, LessonRecord};
use hanzi_store::{DocumentStore, LessonRepository, StoreLessonRepository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Answer to a learned-status query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Position the query was evaluated at
    pub position: CurriculumPosition,
    /// Checked characters already learned, counting repeats
    pub total_learned: usize,
    /// Checked characters, counting repeats
    pub total_queried: usize,
    /// One verdict per checked character, in input order
    pub results: Vec<CharacterVerdict>,
    /// `"{publisher} 1-1-1 ~ {G}-{S}-{L}"`
    pub course_range: String,
    /// Times this character set has been asked at this position
    pub search_count: u64,
    /// Served from the query cache
    pub cache_hit: bool,
}

/// Front door for learned-status and vocabulary lookups
#[derive(Debug, Clone)]
pub struct AggregationService {
    query: QueryCache,
    lessons: Arc<dyn LessonRepository>,
}

impl AggregationService {
    /// Create a service over explicit collaborators
    #[must_use]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        lessons: Arc<dyn LessonRepository>,
        clock: Arc<dyn Clock>,
        config: CacheConfig,
    ) -> Self {
        let cumulative =
            CumulativeCache::new(store.clone(), lessons.clone(), clock.clone(), config);
        Self {
            query: QueryCache::new(store, cumulative, clock),
            lessons,
        }
    }

    /// Create a service reading lessons from the same store, on the system clock
    #[must_use]
    pub fn from_store(store: Arc<dyn DocumentStore>, config: CacheConfig) -> Self {
        let lessons = Arc::new(StoreLessonRepository::new(store.clone()));
        Self::new(store, lessons, Arc::new(SystemClock), config)
    }

    /// Which characters of `query_text` a student at `position` has learned
    ///
    /// # Errors
    /// - `AggregationError::IncomparablePositions` if `publisher` differs from
    ///   the position's publisher
    /// - `AggregationError::EmptyQuery` if the text holds no ideographs
    /// - `AggregationError::AggregationUnavailable` on store or repository
    ///   failure
    pub async fn query_learned_status(
        &self,
        publisher: &str,
        position: &CurriculumPosition,
        query_text: &str,
    ) -> AggregationResult<QueryResult> {
        if publisher != position.publisher() {
            return Err(AggregationError::IncomparablePositions {
                left: publisher.to_string(),
                right: position.publisher().to_string(),
            });
        }

        let characters = ideographs(query_text);
        if characters.is_empty() {
            return Err(AggregationError::EmptyQuery);
        }

        let outcome = self.query.get(position, &characters).await?;
        let total_learned = outcome.results.iter().filter(|v| v.is_learned).count();
        tracing::info!(
            position = %position,
            total_learned,
            total_queried = outcome.results.len(),
            cache_hit = outcome.cache_hit,
            "learned status"
        );

        Ok(QueryResult {
            position: position.clone(),
            total_learned,
            total_queried: outcome.results.len(),
            results: outcome.results,
            course_range: outcome.cumulative.course_range,
            search_count: outcome.search_count,
            cache_hit: outcome.cache_hit,
        })
    }

    /// Cumulative vocabulary up to and including `position`
    ///
    /// # Errors
    /// Returns `AggregationError::AggregationUnavailable` on store or
    /// repository failure
    pub async fn cumulative_vocabulary(
        &self,
        position: &CurriculumPosition,
    ) -> AggregationResult<CumulativeCacheEntry> {
        self.query.cumulative().get(position).await
    }

    /// One lesson as stored
    ///
    /// # Errors
    /// Returns `AggregationError::AggregationUnavailable` on store failure
    pub async fn lesson(
        &self,
        position: &CurriculumPosition,
    ) -> AggregationResult<Option<LessonRecord>> {
        Ok(self
            .lessons
            .get_lesson(
                position.publisher(),
                position.grade(),
                position.semester(),
                position.lesson(),
            )
            .await?)
    }

    /// Drop cumulative entries at `position`, or all of them
    ///
    /// # Errors
    /// Returns `AggregationError::AggregationUnavailable` on store failure
    pub async fn clear_cumulative_cache(
        &self,
        position: Option<&CurriculumPosition>,
    ) -> AggregationResult<usize> {
        self.query.cumulative().clear(position).await
    }

    /// Drop query entries at `position`, or all of them
    ///
    /// # Errors
    /// Returns `AggregationError::AggregationUnavailable` on store failure
    pub async fn clear_query_cache(
        &self,
        position: Option<&CurriculumPosition>,
    ) -> AggregationResult<usize> {
        self.query.clear(position).await
    }
}
