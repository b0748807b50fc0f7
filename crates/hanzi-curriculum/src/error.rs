//! Error types for curriculum positions

/// Errors raised while constructing or comparing curriculum positions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    /// Positions belong to different publishers and have no common timeline
    #[error("positions are incomparable: '{left}' and '{right}' belong to different publishers")]
    IncomparablePositions {
        /// Publisher of the left-hand position
        left: String,
        /// Publisher of the right-hand position
        right: String,
    },

    /// Publisher name was empty or whitespace
    #[error("publisher must not be empty")]
    EmptyPublisher,

    /// Grade must be at least 1
    #[error("invalid grade: {0} (grades start at 1)")]
    InvalidGrade(u32),

    /// Semester must be 1 or 2
    #[error("invalid semester: {0} (expected 1 or 2)")]
    InvalidSemester(u32),

    /// Lesson must be at least 1
    #[error("invalid lesson: {0} (lessons start at 1)")]
    InvalidLesson(u32),
}

impl PositionError {
    /// Create incomparable-positions error
    pub fn incomparable(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::IncomparablePositions {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// Result type alias for position operations
pub type PositionResult<T> = Result<T, PositionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomparable_display_names_both_publishers() {
        let err = PositionError::incomparable("康軒", "翰林");
        let text = err.to_string();
        assert!(text.contains("康軒"));
        assert!(text.contains("翰林"));
    }

    #[test]
    fn semester_display() {
        assert_eq!(
            PositionError::InvalidSemester(3).to_string(),
            "invalid semester: 3 (expected 1 or 2)"
        );
    }
}
