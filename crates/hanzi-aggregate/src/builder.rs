//! Cumulative vocabulary computation
//!
//! Pure function of a lesson snapshot and a target position. Repeated runs
//! over the same snapshot produce identical output, which is what makes
//! concurrent cache rebuilds safe.

use crate::error::AggregationResult;
use hanzi_curriculum::{is_at_or_before, CurriculumPosition, LessonRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A learned character and the lesson that first taught it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedCharacter {
    /// The character
    pub character: String,
    /// Earliest lesson teaching it
    pub first_appearance: CurriculumPosition,
}

/// Characters known at a position, in first-appearance order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CumulativeSet {
    entries: IndexMap<String, CurriculumPosition>,
}

impl CumulativeSet {
    /// Whether `character` has been taught
    #[inline]
    #[must_use]
    pub fn contains(&self, character: &str) -> bool {
        self.entries.contains_key(character)
    }

    /// Number of distinct characters
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been taught
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lesson that introduced `character`
    #[must_use]
    pub fn first_appearance(&self, character: &str) -> Option<&CurriculumPosition> {
        self.entries.get(character)
    }

    /// Characters in first-appearance order
    pub fn characters(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Owned entries in first-appearance order
    #[must_use]
    pub fn into_learned(self) -> Vec<LearnedCharacter> {
        self.entries
            .into_iter()
            .map(|(character, first_appearance)| LearnedCharacter {
                character,
                first_appearance,
            })
            .collect()
    }
}

/// Unions per-lesson vocabulary into the set known at a position
#[derive(Debug, Clone, Copy, Default)]
pub struct CumulativeSetBuilder;

impl CumulativeSetBuilder {
    /// Build the cumulative set at `target`
    ///
    /// `lessons` may arrive in any order; they are processed in curriculum
    /// order so each character is attributed to the earliest lesson that
    /// teaches it. Within a lesson, authoring order breaks ties.
    ///
    /// # Errors
    /// - `AggregationError::IncomparablePositions` if a lesson belongs to a
    ///   different publisher than `target`
    /// - `AggregationError::InvalidPosition` if a lesson's position is invalid
    pub fn build(
        &self,
        lessons: &[LessonRecord],
        target: &CurriculumPosition,
    ) -> AggregationResult<CumulativeSet> {
        let mut covered = Vec::with_capacity(lessons.len());
        for lesson in lessons {
            let position = lesson.position()?;
            if is_at_or_before(&position, target)? {
                covered.push((position, lesson));
            }
        }
        // stable: storage order only matters for duplicate identities
        covered.sort_by_key(|(position, _)| position.timeline_key());

        let mut entries = IndexMap::new();
        for (position, lesson) in covered {
            for entry in &lesson.characters {
                if entry.character.is_empty() || entries.contains_key(&entry.character) {
                    continue;
                }
                entries.insert(entry.character.clone(), position.clone());
            }
        }

        Ok(CumulativeSet { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AggregationError;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn pos(g: u32, s: u32, l: u32) -> CurriculumPosition {
        CurriculumPosition::new("康軒", g, s, l).unwrap()
    }

    fn lesson(g: u32, s: u32, l: u32, chars: &[&str]) -> LessonRecord {
        LessonRecord::new("康軒", g, s, l, chars.iter().copied())
    }

    fn scenario() -> Vec<LessonRecord> {
        // deliberately out of curriculum order
        vec![
            lesson(1, 2, 1, &["他"]),
            lesson(1, 1, 2, &["我"]),
            lesson(1, 1, 1, &["你", "好"]),
        ]
    }

    #[test]
    fn includes_only_lessons_at_or_before_target() {
        let set = CumulativeSetBuilder.build(&scenario(), &pos(1, 1, 2)).unwrap();
        assert_eq!(set.characters().collect::<Vec<_>>(), vec!["你", "好", "我"]);
        assert!(!set.contains("他"));
    }

    #[test]
    fn first_appearance_is_earliest_lesson() {
        let lessons = vec![
            lesson(2, 1, 1, &["大", "我"]),
            lesson(1, 1, 3, &["我"]),
        ];
        let set = CumulativeSetBuilder.build(&lessons, &pos(3, 1, 1)).unwrap();
        assert_eq!(set.first_appearance("我"), Some(&pos(1, 1, 3)));
        assert_eq!(set.characters().collect::<Vec<_>>(), vec!["我", "大"]);
    }

    #[test]
    fn duplicates_within_lesson_collapse() {
        let lessons = vec![lesson(1, 1, 1, &["好", "好", "你", "好"])];
        let set = CumulativeSetBuilder.build(&lessons, &pos(1, 1, 1)).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.characters().collect::<Vec<_>>(), vec!["好", "你"]);
    }

    #[test]
    fn no_lessons_is_empty_not_error() {
        let set = CumulativeSetBuilder.build(&[], &pos(1, 1, 1)).unwrap();
        assert!(set.is_empty());

        let later_only = vec![lesson(4, 1, 1, &["山"])];
        let set = CumulativeSetBuilder.build(&later_only, &pos(1, 1, 1)).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn foreign_publisher_lesson_is_rejected() {
        let lessons = vec![LessonRecord::new("翰林", 1, 1, 1, ["你"])];
        let err = CumulativeSetBuilder.build(&lessons, &pos(1, 1, 1)).unwrap_err();
        assert!(matches!(err, AggregationError::IncomparablePositions { .. }));
    }

    #[test]
    fn learned_entries_serialize_camel_case() {
        let set = CumulativeSetBuilder
            .build(&[lesson(1, 1, 1, &["你"])], &pos(1, 1, 1))
            .unwrap();
        let json = serde_json::to_value(set.into_learned()).unwrap();
        assert_eq!(json[0]["character"], "你");
        assert_eq!(json[0]["firstAppearance"]["lesson"], 1);
    }

    fn arb_lessons() -> impl Strategy<Value = Vec<LessonRecord>> {
        let chars = vec!["你", "好", "我", "他", "大", "小", "山", "水"];
        proptest::collection::btree_map(
            (1..4u32, 1..=2u32, 1..5u32),
            proptest::collection::vec(proptest::sample::select(chars), 0..5),
            0..12,
        )
        .prop_map(|map| {
            map.into_iter()
                .map(|((g, s, l), cs)| lesson(g, s, l, &cs))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_build_is_idempotent(
            lessons in arb_lessons(),
            target in (1..4u32, 1..=2u32, 1..5u32),
        ) {
            let target = pos(target.0, target.1, target.2);
            let first = CumulativeSetBuilder.build(&lessons, &target).unwrap();
            let second = CumulativeSetBuilder.build(&lessons, &target).unwrap();
            prop_assert_eq!(first.into_learned(), second.into_learned());
        }

        #[test]
        fn prop_build_ignores_storage_order(
            lessons in arb_lessons(),
            target in (1..4u32, 1..=2u32, 1..5u32),
        ) {
            let target = pos(target.0, target.1, target.2);
            let mut reversed = lessons.clone();
            reversed.reverse();
            let a = CumulativeSetBuilder.build(&lessons, &target).unwrap();
            let b = CumulativeSetBuilder.build(&reversed, &target).unwrap();
            prop_assert_eq!(a.into_learned(), b.into_learned());
        }

        #[test]
        fn prop_monotonic_in_position(
            lessons in arb_lessons(),
            a in (1..4u32, 1..=2u32, 1..5u32),
            b in (1..4u32, 1..=2u32, 1..5u32),
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let small = CumulativeSetBuilder.build(&lessons, &pos(lo.0, lo.1, lo.2)).unwrap();
            let large = CumulativeSetBuilder.build(&lessons, &pos(hi.0, hi.1, hi.2)).unwrap();
            for c in small.characters() {
                prop_assert!(large.contains(c));
            }
        }
    }
}
