//! Testing utilities for Hanzi Ledger workspace
//!
//! Shared fixtures, seeded stores and an instrumented lesson repository.

#![allow(missing_docs)]

use async_trait::async_trait;
use hanzi_curriculum::{CurriculumPosition, LessonRecord};
use hanzi_store::{LessonRepository, MemoryStore, StoreError, StoreLessonRepository, StoreResult};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const KANGXUAN: &str = "康軒";
pub const HANLIN: &str = "翰林";

pub fn position(grade: u32, semester: u32, lesson: u32) -> CurriculumPosition {
    CurriculumPosition::new(KANGXUAN, grade, semester, lesson).unwrap()
}

pub fn lesson(grade: u32, semester: u32, lesson: u32, characters: &str) -> LessonRecord {
    LessonRecord::new(
        KANGXUAN,
        grade,
        semester,
        lesson,
        characters.chars().map(String::from),
    )
}

/// (1,1,1) 你好, (1,1,2) 我, (1,2,1) 他
pub fn kangxuan_lessons() -> Vec<LessonRecord> {
    vec![
        lesson(1, 1, 1, "你好"),
        lesson(1, 1, 2, "我"),
        lesson(1, 2, 1, "他"),
    ]
}

pub async fn seeded_store(lessons: &[LessonRecord]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let repo = StoreLessonRepository::new(store.clone());
    for l in lessons {
        repo.put_lesson(l).await.unwrap();
    }
    store
}

/// In-memory lesson source that records calls and can fail or stall on demand
#[derive(Debug, Default)]
pub struct FixtureRepository {
    lessons: RwLock<Vec<LessonRecord>>,
    list_calls: AtomicUsize,
    failing: AtomicBool,
    delay: RwLock<Duration>,
}

impl FixtureRepository {
    pub fn new(lessons: Vec<LessonRecord>) -> Self {
        Self {
            lessons: RwLock::new(lessons),
            ..Self::default()
        }
    }

    pub fn kangxuan() -> Self {
        Self::new(kangxuan_lessons())
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.write() = delay;
    }

    /// Simulate a curriculum editor changing content
    pub fn replace_lessons(&self, lessons: Vec<LessonRecord>) {
        *self.lessons.write() = lessons;
    }
}

#[async_trait]
impl LessonRepository for FixtureRepository {
    async fn list_lessons(&self, publisher: &str) -> StoreResult<Vec<LessonRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.read();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("fixture repository failing".to_string()));
        }
        Ok(self
            .lessons
            .read()
            .iter()
            .filter(|l| l.publisher == publisher)
            .cloned()
            .collect())
    }

    async fn get_lesson(
        &self,
        publisher: &str,
        grade: u32,
        semester: u32,
        lesson: u32,
    ) -> StoreResult<Option<LessonRecord>> {
        Ok(self
            .lessons
            .read()
            .iter()
            .find(|l| {
                l.publisher == publisher
                    && l.grade == grade
                    && l.semester == semester
                    && l.lesson == lesson
            })
            .cloned())
    }
}
