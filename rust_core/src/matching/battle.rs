//! Head-to-head ("battle") detection.
//!
//! Pure lexical check, independent of scoring. A battle outcome additionally
//! requires two independently qualifying bands; that rule lives in the
//! pipeline.

/// Separator tokens and words that signal head-to-head phrasing.
static BATTLE_MARKERS: &[&str] = &[
    " vs ",
    " vs. ",
    " v ",
    " v. ",
    " versus ",
    "battle",
    "botb",
    "band battle",
    "battle of the bands",
    "showdown",
    "face off",
    "faceoff",
];

/// True when the lowercased text contains any head-to-head marker.
pub fn is_battle(text: &str) -> bool {
    BATTLE_MARKERS.iter().any(|marker| text.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_separator_tokens() {
        assert!(is_battle("jackson state vs southern university"));
        assert!(is_battle("jsu vs. su full game"));
        assert!(is_battle("grambling v southern"));
        assert!(is_battle("alcorn versus jackson state"));
    }

    #[test]
    fn detects_battle_words() {
        assert!(is_battle("battle of the bands 2024"));
        assert!(is_battle("fifth quarter showdown"));
        assert!(is_battle("botb recap"));
        assert!(is_battle("percussion faceoff"));
    }

    #[test]
    fn separator_tokens_require_surrounding_spaces() {
        // "v" inside ordinary words must not trigger.
        assert!(!is_battle("university halftime performance"));
        assert!(!is_battle("vstream replay"));
    }

    #[test]
    fn plain_performance_text_is_not_a_battle() {
        assert!(!is_battle("human jukebox halftime show"));
    }
}
