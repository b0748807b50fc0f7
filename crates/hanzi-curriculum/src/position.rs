//! Curriculum positions and their ordering
//!
//! A [`CurriculumPosition`] names one lesson inside one publisher's textbook
//! series. Positions of the same publisher are totally ordered by
//! `(grade, semester, lesson)`; positions of different publishers have no
//! order at all, so [`compare`] is the only sanctioned way to order them.

use crate::error::{PositionError, PositionResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// First semester of a school year
pub const FIRST_SEMESTER: u32 = 1;

/// Second semester of a school year
pub const SECOND_SEMESTER: u32 = 2;

/// `(publisher, grade, semester, lesson)` tuple
///
/// Construction validates every component, so a value of this type always
/// names a well-formed point on a curriculum timeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPosition", into = "RawPosition")]
pub struct CurriculumPosition {
    publisher: String,
    grade: u32,
    semester: u32,
    lesson: u32,
}

impl CurriculumPosition {
    /// Create a validated position
    ///
    /// # Errors
    /// - `PositionError::EmptyPublisher` if the publisher is blank
    /// - `PositionError::InvalidGrade` if `grade == 0`
    /// - `PositionError::InvalidSemester` unless `semester` is 1 or 2
    /// - `PositionError::InvalidLesson` if `lesson == 0`
    pub fn new(
        publisher: impl Into<String>,
        grade: u32,
        semester: u32,
        lesson: u32,
    ) -> PositionResult<Self> {
        let publisher = publisher.into();
        if publisher.trim().is_empty() {
            return Err(PositionError::EmptyPublisher);
        }
        if grade == 0 {
            return Err(PositionError::InvalidGrade(grade));
        }
        if !(FIRST_SEMESTER..=SECOND_SEMESTER).contains(&semester) {
            return Err(PositionError::InvalidSemester(semester));
        }
        if lesson == 0 {
            return Err(PositionError::InvalidLesson(lesson));
        }
        Ok(Self {
            publisher,
            grade,
            semester,
            lesson,
        })
    }

    /// First lesson of a publisher's timeline
    ///
    /// # Errors
    /// Returns `PositionError::EmptyPublisher` for a blank publisher
    pub fn start_of(publisher: impl Into<String>) -> PositionResult<Self> {
        Self::new(publisher, 1, FIRST_SEMESTER, 1)
    }

    /// Publisher owning this timeline
    #[inline]
    #[must_use]
    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    /// School grade (1-based)
    #[inline]
    #[must_use]
    pub fn grade(&self) -> u32 {
        self.grade
    }

    /// Semester within the grade (1 or 2)
    #[inline]
    #[must_use]
    pub fn semester(&self) -> u32 {
        self.semester
    }

    /// Lesson within the semester (1-based)
    #[inline]
    #[must_use]
    pub fn lesson(&self) -> u32 {
        self.lesson
    }

    /// Sort key within a single publisher
    #[inline]
    #[must_use]
    pub fn timeline_key(&self) -> (u32, u32, u32) {
        (self.grade, self.semester, self.lesson)
    }

    /// Compact `G-S-L` label
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}-{}-{}", self.grade, self.semester, self.lesson)
    }
}

impl PartialOrd for CurriculumPosition {
    /// `None` across publishers, timeline order otherwise
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        compare(self, other).ok()
    }
}

impl fmt::Display for CurriculumPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.publisher, self.label())
    }
}

/// Order two positions on their shared timeline
///
/// # Errors
/// Returns `PositionError::IncomparablePositions` when the publishers differ
pub fn compare(a: &CurriculumPosition, b: &CurriculumPosition) -> PositionResult<Ordering> {
    if a.publisher != b.publisher {
        return Err(PositionError::incomparable(&a.publisher, &b.publisher));
    }
    Ok(a.timeline_key().cmp(&b.timeline_key()))
}

/// Whether `lesson` has been covered by the time a learner reaches `position`
///
/// # Errors
/// Returns `PositionError::IncomparablePositions` when the publishers differ
pub fn is_at_or_before(
    lesson: &CurriculumPosition,
    position: &CurriculumPosition,
) -> PositionResult<bool> {
    compare(lesson, position).map(Ordering::is_le)
}

/// Serde wire shape, validated on the way in
#[derive(Serialize, Deserialize)]
struct RawPosition {
    publisher: String,
    grade: u32,
    semester: u32,
    lesson: u32,
}

impl TryFrom<RawPosition> for CurriculumPosition {
    type Error = PositionError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Self::new(raw.publisher, raw.grade, raw.semester, raw.lesson)
    }
}

impl From<CurriculumPosition> for RawPosition {
    fn from(p: CurriculumPosition) -> Self {
        Self {
            publisher: p.publisher,
            grade: p.grade,
            semester: p.semester,
            lesson: p.lesson,
        }
    }
}
