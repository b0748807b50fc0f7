//! CJK ideograph filtering for free-text queries

/// Unicode blocks holding CJK unified and compatibility ideographs
const IDEOGRAPH_RANGES: &[(u32, u32)] = &[
    (0x3400, 0x4DBF),   // Extension A
    (0x4E00, 0x9FFF),   // Unified Ideographs
    (0xF900, 0xFAFF),   // Compatibility Ideographs
    (0x20000, 0x2A6DF), // Extension B
    (0x2A700, 0x2EBEF), // Extensions C-F
    (0x2F800, 0x2FA1F), // Compatibility Supplement
    (0x30000, 0x323AF), // Extensions G-H
];

/// Whether `c` is a CJK ideograph
#[must_use]
pub fn is_cjk_ideograph(c: char) -> bool {
    let cp = u32::from(c);
    IDEOGRAPH_RANGES
        .iter()
        .any(|&(lo, hi)| (lo..=hi).contains(&cp))
}

/// Every CJK ideograph of `text`, one string per occurrence, in input order
///
/// Punctuation, Latin letters, digits, bopomofo and whitespace are dropped.
#[must_use]
pub fn ideographs(text: &str) -> Vec<String> {
    text.chars()
        .filter(|&c| is_cjk_ideograph(c))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_non_ideographs() {
        assert_eq!(ideographs("你, hello 我ㄅ123他！"), vec!["你", "我", "他"]);
    }

    #[test]
    fn keeps_repeats_in_order() {
        assert_eq!(ideographs("我我你"), vec!["我", "我", "你"]);
    }

    #[test]
    fn extension_b_counts() {
        assert!(is_cjk_ideograph('\u{20BB7}'));
        assert!(!is_cjk_ideograph('ㄅ'));
        assert!(!is_cjk_ideograph('。'));
    }

    #[test]
    fn empty_when_nothing_matches() {
        assert!(ideographs("abc ,.!").is_empty());
    }
}
