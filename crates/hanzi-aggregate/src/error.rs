//! Error types for vocabulary aggregation
//!
//! Every variant reaches the caller unchanged. Nothing in this crate turns a
//! failure into a "not learned" verdict.

use hanzi_curriculum::PositionError;
use hanzi_store::StoreError;

/// Errors surfaced by the builder, the caches and the service above them
#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    /// Positions of different publishers were compared (caller bug)
    #[error("incomparable positions: '{left}' vs '{right}'")]
    IncomparablePositions {
        /// Publisher on the left
        left: String,
        /// Publisher on the right
        right: String,
    },

    /// A position failed validation
    #[error("invalid position: {0}")]
    InvalidPosition(PositionError),

    /// Lesson repository or cache store could not serve the request
    #[error("aggregation unavailable: {0}")]
    AggregationUnavailable(#[from] StoreError),

    /// Query text held no CJK ideographs
    #[error("query contains no CJK characters")]
    EmptyQuery,

    /// The background rebuild task died before finishing
    #[error("rebuild aborted: {0}")]
    RebuildAborted(String),
}

impl AggregationError {
    /// Whether the caller may reasonably try again later
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AggregationUnavailable(_) | Self::RebuildAborted(_))
    }
}

impl From<PositionError> for AggregationError {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::IncomparablePositions { left, right } => {
                Self::IncomparablePositions { left, right }
            }
            other => Self::InvalidPosition(other),
        }
    }
}

/// Result type alias for aggregation operations
pub type AggregationResult<T> = Result<T, AggregationError>;
