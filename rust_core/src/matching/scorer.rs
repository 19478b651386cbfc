//! Confidence scoring of video text against the alias table.
//!
//! Matching runs on normalized text (see `utils::text::normalize`). Short
//! aliases must match as whole words so a two-letter abbreviation cannot
//! match inside an unrelated longer word; longer aliases match as plain
//! substrings. Every band contributes at most one candidate: its
//! highest-scoring alias.

use super::alias::{AliasTable, BandAliases, MIN_ALIAS_LEN};
use crate::models::{BandCategory, MatchCandidate, MatchKind};
use crate::utils::text::{char_offset, find_substring, find_word};

/// Aliases at or below this length must match as whole words.
const WORD_BOUNDARY_MAX_LEN: usize = 4;

/// Matches starting within this many characters of the text get the early
/// boost: titles and early description are more reliable than trailing text.
const EARLY_WINDOW_CHARS: usize = 200;
const EARLY_MATCH_BOOST: u32 = 10;

// Base scores, highest specificity first.
const SCORE_ALL_STAR_EXACT: u32 = 110;
const SCORE_ALL_STAR_LONG: u32 = 90;
const SCORE_ALL_STAR_SHORT: u32 = 70;
const SCORE_TRADITIONAL_NAME: u32 = 100;
const SCORE_TRADITIONAL_SCHOOL: u32 = 80;
const SCORE_TRADITIONAL_LONG: u32 = 60;
const SCORE_TRADITIONAL_MEDIUM: u32 = 50;
const SCORE_TRADITIONAL_ABBREV: u32 = 30;

/// Score every band against `haystack` (normalized lowercase text).
///
/// Returns candidates descending by score. Equal scores keep alias-table
/// declaration order (stable sort): the first-declared band wins ties.
pub fn score_text(haystack: &str, table: &AliasTable) -> Vec<MatchCandidate> {
    let mut candidates: Vec<MatchCandidate> = table
        .entries()
        .iter()
        .filter_map(|entry| best_candidate(haystack, entry))
        .collect();
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
}

/// The band's best (alias, score) pair, if any alias matches.
fn best_candidate(haystack: &str, entry: &BandAliases) -> Option<MatchCandidate> {
    let mut best: Option<(u32, &str)> = None;

    for alias in &entry.aliases {
        let len = alias.chars().count();
        if len < MIN_ALIAS_LEN {
            continue;
        }

        let pos = if len <= WORD_BOUNDARY_MAX_LEN {
            find_word(haystack, alias)
        } else {
            find_substring(haystack, alias)
        };
        let Some(pos) = pos else { continue };

        let mut score = base_score(entry, alias, len);
        if char_offset(haystack, pos) < EARLY_WINDOW_CHARS {
            score += EARLY_MATCH_BOOST;
        }

        // Strictly greater: on a score tie the earlier alias wins.
        if best.map_or(true, |(s, _)| score > s) {
            best = Some((score, alias));
        }
    }

    best.map(|(score, alias)| MatchCandidate {
        band_id: entry.band_id,
        alias: alias.to_string(),
        score,
        kind: MatchKind::Alias,
    })
}

fn base_score(entry: &BandAliases, alias: &str, len: usize) -> u32 {
    match entry.category {
        BandCategory::AllStar => {
            if alias == entry.name {
                SCORE_ALL_STAR_EXACT
            } else if len >= 4 {
                SCORE_ALL_STAR_LONG
            } else {
                SCORE_ALL_STAR_SHORT
            }
        }
        BandCategory::Traditional => {
            if alias == entry.name {
                SCORE_TRADITIONAL_NAME
            } else if alias == entry.school {
                SCORE_TRADITIONAL_SCHOOL
            } else if len >= 8 {
                SCORE_TRADITIONAL_LONG
            } else if len >= 5 {
                SCORE_TRADITIONAL_MEDIUM
            } else {
                SCORE_TRADITIONAL_ABBREV
            }
        }
    }
}
