//! Lesson repository over the `lessons` collection
//!
//! This is the boundary where loosely-shaped lesson documents become typed
//! [`LessonRecord`]s. Older documents stored characters as bare strings or
//! used `char`/`word` for the character field; they are adapted here so no
//! code past the repository ever sees a legacy shape.

use crate::document::{encode, Document};
use crate::error::{StoreError, StoreResult};
use crate::store::{DocumentStore, LESSONS};
use async_trait::async_trait;
use hanzi_curriculum::{lesson_document_key, CharacterEntry, LessonRecord};
use serde::Deserialize;
use std::fmt::Debug;
use std::sync::Arc;

/// Read-only source of lesson content
#[async_trait]
pub trait LessonRepository: Send + Sync + Debug {
    /// Every lesson of a publisher, in no particular order
    async fn list_lessons(&self, publisher: &str) -> StoreResult<Vec<LessonRecord>>;

    /// One lesson, if it exists
    async fn get_lesson(
        &self,
        publisher: &str,
        grade: u32,
        semester: u32,
        lesson: u32,
    ) -> StoreResult<Option<LessonRecord>>;
}

/// [`LessonRepository`] reading lesson documents from a [`DocumentStore`]
#[derive(Debug, Clone)]
pub struct StoreLessonRepository {
    store: Arc<dyn DocumentStore>,
}

impl StoreLessonRepository {
    /// Wrap a document store
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create or replace a lesson document
    ///
    /// # Errors
    /// - `StoreError::Malformed` if the lesson has an invalid position
    /// - any backend error from the store
    pub async fn put_lesson(&self, lesson: &LessonRecord) -> StoreResult<()> {
        let key = lesson.document_key();
        lesson
            .position()
            .map_err(|e| StoreError::malformed(LESSONS, &key, e.to_string()))?;
        self.store.put(LESSONS, &key, encode(lesson)?).await
    }
}

#[async_trait]
impl LessonRepository for StoreLessonRepository {
    async fn list_lessons(&self, publisher: &str) -> StoreResult<Vec<LessonRecord>> {
        let prefix = format!("{publisher}_");
        let mut lessons = Vec::new();
        for (key, document) in self.store.list(LESSONS).await? {
            if !key.starts_with(&prefix) {
                continue;
            }
            let lesson = adapt_lesson(&key, document)?;
            // A prefix match alone is ambiguous ("A" vs "A_B")
            if lesson.publisher == publisher {
                lessons.push(lesson);
            }
        }
        tracing::debug!(publisher, count = lessons.len(), "listed lessons");
        Ok(lessons)
    }

    async fn get_lesson(
        &self,
        publisher: &str,
        grade: u32,
        semester: u32,
        lesson: u32,
    ) -> StoreResult<Option<LessonRecord>> {
        let key = lesson_document_key(publisher, grade, semester, lesson);
        self.store
            .get(LESSONS, &key)
            .await?
            .map(|document| adapt_lesson(&key, document))
            .transpose()
    }
}

/// Decode a lesson document, accepting legacy character shapes
///
/// # Errors
/// Returns `StoreError::Malformed` when the document matches no known shape
pub fn adapt_lesson(key: &str, document: Document) -> StoreResult<LessonRecord> {
    let raw: LessonDocument = serde_json::from_value(document)
        .map_err(|e| StoreError::malformed(LESSONS, key, e.to_string()))?;
    Ok(raw.into_record())
}

#[derive(Deserialize)]
struct LessonDocument {
    publisher: String,
    grade: u32,
    semester: u32,
    lesson: u32,
    #[serde(default)]
    characters: CharactersShape,
}

impl LessonDocument {
    fn into_record(self) -> LessonRecord {
        let characters = match self.characters {
            CharactersShape::Text(text) => split_plain(&text),
            CharactersShape::List(items) => items
                .into_iter()
                .flat_map(CharacterShape::into_entries)
                .collect(),
        };
        LessonRecord {
            publisher: self.publisher,
            grade: self.grade,
            semester: self.semester,
            lesson: self.lesson,
            characters,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CharactersShape {
    List(Vec<CharacterShape>),
    Text(String),
}

impl Default for CharactersShape {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CharacterShape {
    Plain(String),
    Entry {
        #[serde(alias = "char", alias = "word")]
        character: String,
        #[serde(default)]
        zhuyin: Option<String>,
        #[serde(default)]
        examples: ExamplesShape,
    },
}

impl CharacterShape {
    fn into_entries(self) -> Vec<CharacterEntry> {
        match self {
            Self::Plain(text) => split_plain(&text),
            Self::Entry {
                character,
                zhuyin,
                examples,
            } => {
                let character = character.trim().to_string();
                if character.is_empty() {
                    return Vec::new();
                }
                vec![CharacterEntry {
                    character,
                    zhuyin: zhuyin.filter(|z| !z.trim().is_empty()),
                    examples: examples.into_vec(),
                }]
            }
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(untagged)]
enum ExamplesShape {
    #[default]
    Missing,
    One(String),
    Many(Vec<String>),
}

impl ExamplesShape {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::Missing => Vec::new(),
            Self::One(s) if s.trim().is_empty() => Vec::new(),
            Self::One(s) => vec![s],
            Self::Many(v) => v,
        }
    }
}

/// A bare string is one entry per non-whitespace character
fn split_plain(text: &str) -> Vec<CharacterEntry> {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| CharacterEntry::new(c.to_string()))
        .collect()
}
