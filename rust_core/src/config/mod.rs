//! Matcher configuration loading and validation.
//!
//! This module provides:
//! - Typed configuration for traditional and all-star band entries
//! - Exclusion pattern lists, partitioned by reason
//! - Load-time validation: a malformed config aborts the run before any
//!   video is processed, since alias sets would otherwise be silently
//!   incomplete
//! - Near-miss detection between config spellings and band records

use crate::models::Band;
use crate::utils::text::normalize;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read matcher config at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed matcher config at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid matcher config: {0}")]
    Invalid(String),
    #[error("invalid exclusion pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Configuration entry for a traditional (institution-tied) band.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraditionalBandEntry {
    /// School/organization name, matched case-insensitively against the
    /// band's school field.
    pub school: String,
    /// Canonical band name.
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub channel_handle: Option<String>,
}

/// Configuration entry for an all-star (composite/regional) band.
#[derive(Debug, Clone, Deserialize)]
pub struct AllStarBandEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub region: String,
}

/// Exclusion pattern lists. Entries are plain substrings, except `podcasts`
/// entries with a leading space, which compile to word-boundary regexes so
/// one-word show names do not match inside unrelated longer words.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExclusionPatterns {
    #[serde(default)]
    pub high_school: Vec<String>,
    #[serde(default)]
    pub middle_school: Vec<String>,
    #[serde(default)]
    pub podcasts: Vec<String>,
    #[serde(default)]
    pub generic: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatcherConfig {
    #[serde(default)]
    pub traditional: Vec<TraditionalBandEntry>,
    #[serde(default)]
    pub all_star: Vec<AllStarBandEntry>,
    #[serde(default)]
    pub exclusions: ExclusionPatterns,
}

/// Jaro-Winkler similarity above which a non-equal config spelling is
/// reported as a probable typo.
const NEAR_MISS_SIMILARITY: f64 = 0.9;

impl MatcherConfig {
    /// Load and validate a config file. Any failure here is fatal to the run.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(Path::new(path)).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            source: e,
        })?;
        let config: MatcherConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_string(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, entry) in self.traditional.iter().enumerate() {
            if entry.school.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "traditional[{i}] has an empty school name"
                )));
            }
            if entry.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "traditional[{i}] ({}) has an empty band name",
                    entry.school
                )));
            }
        }
        for (i, entry) in self.all_star.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "all_star[{i}] has an empty band name"
                )));
            }
        }
        for pattern in self
            .exclusions
            .high_school
            .iter()
            .chain(&self.exclusions.middle_school)
            .chain(&self.exclusions.podcasts)
            .chain(&self.exclusions.generic)
        {
            if pattern.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "exclusion lists must not contain empty patterns".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// First config entry matching a traditional band, by normalized school
    /// name or by exact (case-insensitive) band name. First-declared wins.
    pub fn traditional_entry(&self, band: &Band) -> Option<&TraditionalBandEntry> {
        let school_norm = normalize(&band.school);
        self.traditional.iter().find(|entry| {
            normalize(&entry.school) == school_norm || entry.name.eq_ignore_ascii_case(&band.name)
        })
    }

    /// All-star config entry for the exact band name, case-insensitive.
    pub fn all_star_entry(&self, band: &Band) -> Option<&AllStarBandEntry> {
        self.all_star
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(&band.name))
    }

    /// Log a warning for every config school name that is a near-miss for a
    /// band's school without matching exactly. First-declared match still
    /// wins; this only makes the silent-typo case observable.
    pub fn warn_near_misses(&self, bands: &[Band]) {
        for entry in &self.traditional {
            let entry_norm = normalize(&entry.school);
            for band in bands {
                let band_norm = normalize(&band.school);
                if entry_norm == band_norm {
                    continue;
                }
                let similarity = strsim::jaro_winkler(&entry_norm, &band_norm);
                if similarity >= NEAR_MISS_SIMILARITY {
                    log::warn!(
                        "config school '{}' is a near-miss for band {} school '{}' (similarity {:.3}); check for a typo",
                        entry.school,
                        band.id,
                        band.school,
                        similarity
                    );
                }
            }
        }
    }
}
