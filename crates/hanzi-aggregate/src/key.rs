//! Deterministic cache keys
//!
//! Cumulative keys are `{publisher}_{grade}_{semester}_{lesson}` lower-cased.
//! Query keys append `_` and the query's distinct characters sorted by code
//! point, so any ordering or repetition of the same characters lands on the
//! same document.

use hanzi_curriculum::CurriculumPosition;
use std::collections::BTreeSet;

/// Separator between key components
pub const KEY_SEPARATOR: char = '_';

/// Key of the cumulative entry at `position`
#[must_use]
pub fn position_key(position: &CurriculumPosition) -> String {
    format!(
        "{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}",
        position.publisher(),
        position.grade(),
        position.semester(),
        position.lesson()
    )
    .to_lowercase()
}

/// Distinct characters sorted by code point
///
/// Byte order of UTF-8 strings is code point order, so a `BTreeSet<&str>`
/// yields exactly that ordering.
#[must_use]
pub fn normalize_query<S: AsRef<str>>(characters: &[S]) -> Vec<String> {
    characters
        .iter()
        .map(AsRef::<str>::as_ref)
        .filter(|c| !c.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Key of the query entry for `characters` at `position`
#[must_use]
pub fn query_key<S: AsRef<str>>(position: &CurriculumPosition, characters: &[S]) -> String {
    let normalized = normalize_query(characters).concat();
    format!("{}{KEY_SEPARATOR}{}", position_key(position), normalized.to_lowercase())
}

/// Prefix shared by every query key at `position`
#[must_use]
pub fn query_prefix(position: &CurriculumPosition) -> String {
    format!("{}{KEY_SEPARATOR}", position_key(position))
}
