//! Text normalization helpers shared by the alias builder and the scorer.
//!
//! All matching happens on normalized text: lowercase, alphanumeric plus
//! single spaces. Normalizing both sides keeps punctuation ("A&M", "vs.")
//! from defeating containment checks.

/// Normalize a string for comparison: lowercase, strip non-alphanumerics,
/// collapse whitespace runs to single spaces.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokenize into normalized words.
pub fn tokenize(s: &str) -> Vec<String> {
    normalize(s)
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

/// Byte offset of `needle` in `text` as plain substring containment.
pub fn find_substring(text: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    text.find(needle)
}

/// Byte offset of `needle` in `text` where the match is delimited by
/// whitespace or the string edges. Both arguments must already be
/// normalized, so "word boundary" reduces to a space check.
pub fn find_word(text: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(pos) = text[start..].find(needle) {
        let abs = start + pos;
        let end = abs + needle.len();
        let left_ok = abs == 0 || bytes[abs - 1] == b' ';
        let right_ok = end == text.len() || bytes[end] == b' ';
        if left_ok && right_ok {
            return Some(abs);
        }
        // Advance one full char to stay on a UTF-8 boundary.
        start = abs
            + text[abs..]
                .chars()
                .next()
                .map(|c| c.len_utf8())
                .unwrap_or(1);
        if start >= text.len() {
            break;
        }
    }
    None
}

/// Number of characters before byte offset `pos`. Used to decide whether a
/// match falls inside the early-text window.
pub fn char_offset(text: &str, pos: usize) -> usize {
    text[..pos].chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("Alabama A&M  University!"), "alabama am university");
        assert_eq!(normalize("  JSU vs. SU  "), "jsu vs su");
    }

    #[test]
    fn tokenize_splits_normalized_words() {
        assert_eq!(tokenize("Sonic Boom of the South"), vec![
            "sonic", "boom", "of", "the", "south"
        ]);
    }

    #[test]
    fn find_word_requires_boundaries() {
        // "su" must not match inside "superstar".
        assert_eq!(find_word("superstar performance", "su"), None);
        assert_eq!(find_word("su jaguars", "su"), Some(0));
        assert_eq!(find_word("the su jaguars", "su"), Some(4));
    }

    #[test]
    fn find_word_matches_multi_word_phrases() {
        let text = "jackson state university homecoming";
        assert_eq!(find_word(text, "jackson state"), Some(0));
        assert_eq!(find_word(text, "state university"), Some(8));
        assert_eq!(find_word(text, "son state"), None);
    }

    #[test]
    fn find_substring_is_plain_containment() {
        assert_eq!(find_substring("superstar", "super"), Some(0));
        assert_eq!(find_substring("superstar", ""), None);
    }

    #[test]
    fn char_offset_counts_characters_not_bytes() {
        let text = "météo band";
        let pos = text.find("band").unwrap();
        assert_eq!(char_offset(text, pos), 6);
    }
}
