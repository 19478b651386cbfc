//! Exclusion filtering.
//!
//! Classifies raw text as off-topic before any matching is attempted.
//! Entirely configuration-driven: no hard-coded band-specific exceptions.
//! Reasons are checked in a fixed order and the first hit wins, so operators
//! can rely on stable exclusion counts across runs.

use crate::config::{ConfigError, ExclusionPatterns};
use crate::models::ExclusionReason;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    high_school: Vec<String>,
    middle_school: Vec<String>,
    podcast_substrings: Vec<String>,
    /// Podcast entries with a leading space compile to word-boundary
    /// patterns so short show names do not match inside longer words.
    podcast_patterns: Vec<Regex>,
    generic: Vec<String>,
}

impl ExclusionFilter {
    pub fn from_patterns(patterns: &ExclusionPatterns) -> Result<Self, ConfigError> {
        let mut podcast_substrings = Vec::new();
        let mut podcast_patterns = Vec::new();

        for entry in &patterns.podcasts {
            if let Some(fragment) = entry.strip_prefix(' ') {
                let pattern = format!(r"\b{}\b", fragment.to_lowercase());
                let regex = Regex::new(&pattern).map_err(|e| ConfigError::Pattern {
                    pattern: entry.clone(),
                    source: e,
                })?;
                podcast_patterns.push(regex);
            } else {
                podcast_substrings.push(entry.to_lowercase());
            }
        }

        Ok(Self {
            high_school: lowercase_all(&patterns.high_school),
            middle_school: lowercase_all(&patterns.middle_school),
            podcast_substrings,
            podcast_patterns,
            generic: lowercase_all(&patterns.generic),
        })
    }

    /// First matching exclusion reason for this text, if any.
    pub fn check(&self, text: &str) -> Option<ExclusionReason> {
        let lower = text.to_lowercase();

        if self.high_school.iter().any(|p| lower.contains(p)) {
            return Some(ExclusionReason::HighSchool);
        }
        if self.middle_school.iter().any(|p| lower.contains(p)) {
            return Some(ExclusionReason::MiddleSchool);
        }
        if self.podcast_substrings.iter().any(|p| lower.contains(p))
            || self.podcast_patterns.iter().any(|r| r.is_match(&lower))
        {
            return Some(ExclusionReason::PodcastShow);
        }
        if self.generic.iter().any(|p| lower.contains(p)) {
            return Some(ExclusionReason::GenericContent);
        }
        None
    }
}

fn lowercase_all(patterns: &[String]) -> Vec<String> {
    patterns.iter().map(|p| p.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ExclusionFilter {
        ExclusionFilter::from_patterns(&ExclusionPatterns {
            high_school: vec!["high school".to_string(), "varsity".to_string()],
            middle_school: vec!["middle school".to_string(), "junior high".to_string()],
            podcasts: vec!["podcast".to_string(), " bandtalk".to_string()],
            generic: vec!["tutorial".to_string(), "how to play".to_string()],
        })
        .unwrap()
    }

    #[test]
    fn reasons_checked_in_fixed_order() {
        let filter = filter();
        // Both a high-school marker and a podcast marker: high school wins.
        assert_eq!(
            filter.check("High School band podcast episode 4"),
            Some(ExclusionReason::HighSchool)
        );
        assert_eq!(
            filter.check("Junior High showcase podcast"),
            Some(ExclusionReason::MiddleSchool)
        );
    }

    #[test]
    fn middle_school_is_a_separate_reason() {
        let filter = filter();
        assert_eq!(
            filter.check("Central Middle School spring concert"),
            Some(ExclusionReason::MiddleSchool)
        );
    }

    #[test]
    fn leading_space_podcast_entries_use_word_boundaries() {
        let filter = filter();
        // Word-boundary pattern matches the show name on its own...
        assert_eq!(
            filter.check("The BandTalk show, episode 12"),
            Some(ExclusionReason::PodcastShow)
        );
        // ...but not inside a longer word.
        assert_eq!(filter.check("bandtalkers convention"), None);
    }

    #[test]
    fn generic_content_is_last() {
        let filter = filter();
        assert_eq!(
            filter.check("Trumpet tutorial for beginners"),
            Some(ExclusionReason::GenericContent)
        );
    }

    #[test]
    fn clean_text_passes() {
        assert_eq!(filter().check("Human Jukebox halftime show 2024"), None);
    }

    #[test]
    fn invalid_word_boundary_pattern_is_a_config_error() {
        let result = ExclusionFilter::from_patterns(&ExclusionPatterns {
            podcasts: vec![" (unclosed".to_string()],
            ..Default::default()
        });
        assert!(matches!(result, Err(ConfigError::Pattern { .. })));
    }
}
