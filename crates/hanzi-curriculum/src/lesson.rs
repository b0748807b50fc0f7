//! Lesson records as authored by curriculum editors

use crate::error::PositionResult;
use crate::position::CurriculumPosition;
use serde::{Deserialize, Serialize};

/// One character taught in a lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterEntry {
    /// The character itself (a single grapheme)
    pub character: String,

    /// Bopomofo reading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zhuyin: Option<String>,

    /// Example words or phrases
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl CharacterEntry {
    /// Create entry with no reading or examples
    #[inline]
    #[must_use]
    pub fn new(character: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            zhuyin: None,
            examples: Vec::new(),
        }
    }

    /// With zhuyin reading
    #[inline]
    #[must_use]
    pub fn with_zhuyin(mut self, zhuyin: impl Into<String>) -> Self {
        self.zhuyin = Some(zhuyin.into());
        self
    }

    /// With example words
    #[inline]
    #[must_use]
    pub fn with_examples<I, S>(mut self, examples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples = examples.into_iter().map(Into::into).collect();
        self
    }
}

/// A lesson and the ordered characters it teaches
///
/// `(publisher, grade, semester, lesson)` identifies the record. Content is
/// unversioned and may be edited at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRecord {
    /// Textbook publisher
    pub publisher: String,
    /// School grade (1-based)
    pub grade: u32,
    /// Semester (1 or 2)
    pub semester: u32,
    /// Lesson number within the semester (1-based)
    pub lesson: u32,
    /// Characters in authoring order
    #[serde(default)]
    pub characters: Vec<CharacterEntry>,
}

impl LessonRecord {
    /// Create a lesson from plain characters
    #[must_use]
    pub fn new<I, S>(
        publisher: impl Into<String>,
        grade: u32,
        semester: u32,
        lesson: u32,
        characters: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            publisher: publisher.into(),
            grade,
            semester,
            lesson,
            characters: characters.into_iter().map(CharacterEntry::new).collect(),
        }
    }

    /// Validated position of this lesson
    ///
    /// # Errors
    /// Propagates any position validation failure
    pub fn position(&self) -> PositionResult<CurriculumPosition> {
        CurriculumPosition::new(self.publisher.clone(), self.grade, self.semester, self.lesson)
    }

    /// Document key in the `lessons` collection
    #[must_use]
    pub fn document_key(&self) -> String {
        lesson_document_key(&self.publisher, self.grade, self.semester, self.lesson)
    }
}

/// `{publisher}_{grade}_{semester}_{lesson}`
#[must_use]
pub fn lesson_document_key(publisher: &str, grade: u32, semester: u32, lesson: u32) -> String {
    format!("{publisher}_{grade}_{semester}_{lesson}")
}
