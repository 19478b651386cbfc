//! Alias table construction.
//!
//! Derives, per band, the ordered set of normalized strings the scorer is
//! allowed to match. Rebuilt at the start of every run from the current band
//! rows plus the matcher configuration; never persisted. The table is
//! immutable after construction and safe to share across worker threads.

use crate::config::MatcherConfig;
use crate::models::{Band, BandCategory};
use crate::utils::text::normalize;
use rustc_hash::FxHashMap;

/// Aliases shorter than this match too much unrelated text and are dropped.
pub const MIN_ALIAS_LEN: usize = 3;

/// Words skipped when deriving an acronym from a school name.
const ACRONYM_STOP_WORDS: &[&str] = &["of", "the", "at", "and"];

/// Acronyms outside this range are either ambiguous or not acronyms.
const ACRONYM_LEN: std::ops::RangeInclusive<usize> = 2..=5;

#[derive(Debug, Clone)]
pub struct BandAliases {
    pub band_id: i64,
    pub category: BandCategory,
    /// Normalized canonical name.
    pub name: String,
    /// Normalized school/organization name.
    pub school: String,
    /// Normalized aliases in first-insertion order, deduplicated.
    pub aliases: Vec<String>,
}

/// Alias sets for every band, in band declaration order. Declaration order
/// is the documented tie-break for equal-score candidates.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<BandAliases>,
    by_band: FxHashMap<i64, usize>,
}

impl AliasTable {
    /// Build alias sets for all bands. Deterministic for fixed inputs.
    pub fn build(bands: &[Band], config: &MatcherConfig) -> Self {
        let mut entries = Vec::with_capacity(bands.len());
        let mut by_band = FxHashMap::default();

        for band in bands {
            let entry = build_band_aliases(band, config);
            by_band.insert(band.id, entries.len());
            entries.push(entry);
        }

        Self { entries, by_band }
    }

    pub fn entries(&self) -> &[BandAliases] {
        &self.entries
    }

    pub fn get(&self, band_id: i64) -> Option<&BandAliases> {
        self.by_band.get(&band_id).map(|i| &self.entries[*i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn build_band_aliases(band: &Band, config: &MatcherConfig) -> BandAliases {
    let name = normalize(&band.name);
    let school = normalize(&band.school);

    let mut aliases: Vec<String> = Vec::new();
    push_alias(&mut aliases, name.clone());
    push_alias(&mut aliases, school.clone());
    for keyword in &band.keywords {
        push_alias(&mut aliases, normalize(keyword));
    }

    match band.category {
        BandCategory::Traditional => {
            if let Some(entry) = config.traditional_entry(band) {
                for keyword in &entry.keywords {
                    push_alias(&mut aliases, normalize(keyword));
                }
                if let Some(nick) = nickname(&school, &name) {
                    push_alias(&mut aliases, nick);
                }
                if let Some(stripped) = strip_campus_suffix(&school) {
                    push_alias(&mut aliases, stripped);
                }
                if let Some(acr) = acronym(&school) {
                    push_alias(&mut aliases, acr);
                }
            }
        }
        BandCategory::AllStar => {
            if let Some(entry) = config.all_star_entry(band) {
                for alias in &entry.aliases {
                    push_alias(&mut aliases, normalize(alias));
                }
            }
        }
    }

    BandAliases {
        band_id: band.id,
        category: band.category,
        name,
        school,
        aliases,
    }
}

/// Append an alias unless it is too short or already present. Insertion
/// order is preserved so tie-breaks stay deterministic.
fn push_alias(aliases: &mut Vec<String>, alias: String) {
    if alias.chars().count() < MIN_ALIAS_LEN {
        return;
    }
    if aliases.iter().any(|a| *a == alias) {
        return;
    }
    aliases.push(alias);
}

/// The band nickname: the canonical name minus the leading words it shares
/// with the school name ("southern university human jukebox" minus
/// "southern university" -> "human jukebox"). Kept only when the remainder
/// is longer than 3 characters.
fn nickname(school: &str, name: &str) -> Option<String> {
    let school_words: Vec<&str> = school.split(' ').collect();
    let name_words: Vec<&str> = name.split(' ').collect();

    let mut shared = 0;
    while shared < school_words.len()
        && shared < name_words.len()
        && school_words[shared] == name_words[shared]
    {
        shared += 1;
    }
    if shared == 0 || shared == name_words.len() {
        return None;
    }

    let rest = name_words[shared..].join(" ");
    (rest.chars().count() > 3).then_some(rest)
}

/// School name with a trailing "university"/"college" removed, when that
/// leaves something different ("jackson state university" -> "jackson state").
fn strip_campus_suffix(school: &str) -> Option<String> {
    let words: Vec<&str> = school.split(' ').collect();
    let last = *words.last()?;
    if last != "university" && last != "college" {
        return None;
    }
    let stripped = words[..words.len() - 1].join(" ");
    (!stripped.is_empty() && stripped != school).then_some(stripped)
}

/// Acronym from school-word initials, stop-words removed, kept only when
/// 2-5 characters ("jackson state university" -> "jsu").
fn acronym(school: &str) -> Option<String> {
    let acr: String = school
        .split(' ')
        .filter(|w| !ACRONYM_STOP_WORDS.contains(w))
        .filter_map(|w| w.chars().next())
        .collect();
    ACRONYM_LEN.contains(&acr.chars().count()).then_some(acr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AllStarBandEntry, TraditionalBandEntry};

    fn traditional(id: i64, name: &str, school: &str) -> Band {
        Band {
            id,
            name: name.to_string(),
            school: school.to_string(),
            category: BandCategory::Traditional,
            keywords: vec![],
        }
    }

    fn all_star(id: i64, name: &str) -> Band {
        Band {
            id,
            name: name.to_string(),
            school: String::new(),
            category: BandCategory::AllStar,
            keywords: vec![],
        }
    }

    fn config_with(
        traditional: Vec<TraditionalBandEntry>,
        all_star: Vec<AllStarBandEntry>,
    ) -> MatcherConfig {
        MatcherConfig {
            traditional,
            all_star,
            ..Default::default()
        }
    }

    #[test]
    fn seeds_name_and_school() {
        let bands = vec![traditional(1, "Sonic Boom of the South", "Jackson State University")];
        let table = AliasTable::build(&bands, &MatcherConfig::default());
        let entry = table.get(1).unwrap();

        assert!(entry.aliases.contains(&"sonic boom of the south".to_string()));
        assert!(entry.aliases.contains(&"jackson state university".to_string()));
    }

    #[test]
    fn traditional_entry_derives_nickname_suffix_and_acronym() {
        let bands = vec![traditional(
            1,
            "Southern University Human Jukebox",
            "Southern University",
        )];
        let config = config_with(
            vec![TraditionalBandEntry {
                school: "Southern University".to_string(),
                name: "Southern University Human Jukebox".to_string(),
                keywords: vec!["baton rouge".to_string()],
                ..Default::default()
            }],
            vec![],
        );
        let table = AliasTable::build(&bands, &config);
        let aliases = &table.get(1).unwrap().aliases;

        assert!(aliases.contains(&"baton rouge".to_string()));
        // Nickname: shared leading words stripped.
        assert!(aliases.contains(&"human jukebox".to_string()));
        // Trailing "university" stripped.
        assert!(aliases.contains(&"southern".to_string()));
        // Acronym of school initials.
        assert!(aliases.contains(&"su".to_string()));
    }

    #[test]
    fn acronym_skips_stop_words_and_length_bounds() {
        assert_eq!(
            acronym("university of arkansas at pine bluff"),
            Some("uapb".to_string())
        );
        assert_eq!(acronym("jackson state university"), Some("jsu".to_string()));
        // Single effective word -> 1 char, outside 2-5.
        assert_eq!(acronym("southern"), None);
        // Seven initials, outside 2-5.
        assert_eq!(acronym("a b c d e f g"), None);
    }

    #[test]
    fn nickname_requires_shared_prefix_and_min_length() {
        assert_eq!(
            nickname("southern university", "southern university human jukebox"),
            Some("human jukebox".to_string())
        );
        // No shared leading words.
        assert_eq!(nickname("jackson state university", "sonic boom"), None);
        // Name identical to school leaves no remainder.
        assert_eq!(nickname("southern university", "southern university"), None);
    }

    #[test]
    fn all_star_merges_configured_aliases() {
        let bands = vec![all_star(1, "Memphis Mass Band")];
        let config = config_with(
            vec![],
            vec![AllStarBandEntry {
                name: "memphis mass band".to_string(),
                aliases: vec!["Memphis Mass".to_string(), "MMB".to_string()],
                region: "Memphis, TN".to_string(),
            }],
        );
        let table = AliasTable::build(&bands, &config);
        let aliases = &table.get(1).unwrap().aliases;

        assert!(aliases.contains(&"memphis mass band".to_string()));
        assert!(aliases.contains(&"memphis mass".to_string()));
        assert!(aliases.contains(&"mmb".to_string()));
    }

    #[test]
    fn all_star_without_config_falls_back_to_name() {
        let bands = vec![all_star(1, "Mississippi Mass Band")];
        let table = AliasTable::build(&bands, &MatcherConfig::default());
        let entry = table.get(1).unwrap();

        assert_eq!(entry.aliases, vec!["mississippi mass band".to_string()]);
    }

    #[test]
    fn short_aliases_are_dropped() {
        let mut band = traditional(1, "Aristocrat of Bands", "Tennessee State University");
        band.keywords = vec!["ab".to_string(), "aob".to_string()];
        let table = AliasTable::build(&[band], &MatcherConfig::default());
        let aliases = &table.get(1).unwrap().aliases;

        assert!(!aliases.iter().any(|a| a == "ab"));
        assert!(aliases.contains(&"aob".to_string()));
    }

    #[test]
    fn build_is_deterministic_and_never_empty() {
        let bands = vec![
            traditional(1, "Human Jukebox", "Southern University"),
            traditional(2, "Sonic Boom of the South", "Jackson State University"),
            all_star(3, "Memphis Mass Band"),
        ];
        let config = MatcherConfig::default();
        let first = AliasTable::build(&bands, &config);
        let second = AliasTable::build(&bands, &config);

        for (a, b) in first.entries().iter().zip(second.entries()) {
            assert_eq!(a.aliases, b.aliases);
            assert!(!a.aliases.is_empty());
        }
    }
}
