//! Hanzi Curriculum
//!
//! Value types shared by every layer of the ledger:
//!
//! - [`CurriculumPosition`]: `(publisher, grade, semester, lesson)` with a
//!   per-publisher total order
//! - [`LessonRecord`]: the characters one lesson teaches
//! - [`text`]: CJK ideograph extraction for user-supplied query text
//!
//! # Example
//!
//! ```rust
//! use hanzi_curriculum::{is_at_or_before, CurriculumPosition};
//!
//! let lesson = CurriculumPosition::new("康軒", 1, 1, 1).unwrap();
//! let learner = CurriculumPosition::new("康軒", 1, 2, 1).unwrap();
//! assert!(is_at_or_before(&lesson, &learner).unwrap());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod lesson;
pub mod position;
pub mod text;

pub use error::{PositionError, PositionResult};
pub use lesson::{lesson_document_key, CharacterEntry, LessonRecord};
pub use position::{compare, is_at_or_before, CurriculumPosition};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
