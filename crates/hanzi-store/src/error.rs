//! Error types for document storage

use std::path::PathBuf;

/// Errors raised by a document store or a repository built on one
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Filesystem failure in a file-backed store
    #[error("io error at {path}: {source}")]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A value could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored document does not have the expected shape
    #[error("malformed document {collection}/{key}: {message}")]
    Malformed {
        /// Collection holding the document
        collection: String,
        /// Document key
        key: String,
        /// What was wrong
        message: String,
    },
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create malformed-document error
    pub fn malformed(
        collection: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Malformed {
            collection: collection.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether a stored document exists but could not be read
    #[inline]
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
