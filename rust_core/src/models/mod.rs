// Shared models for FifthQuarter Rust services
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Redis channels (cross-service messaging)
// ============================================================================

pub mod channels {
    /// Run requests consumed by the video matcher service.
    pub const MATCHER_REQUESTS: &str = "matcher:requests";
    /// Run summaries published after each batch.
    pub const MATCHER_RESULTS: &str = "matcher:results";
    /// Service heartbeats for real-time observability.
    pub const HEARTBEATS: &str = "health:heartbeats";
}

// ============================================================================
// Band
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BandCategory {
    /// Tied to a single academic institution.
    Traditional,
    /// Composite/regional ensemble with no single institution.
    AllStar,
}

impl BandCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BandCategory::Traditional => "TRADITIONAL",
            BandCategory::AllStar => "ALL_STAR",
        }
    }

    /// Parse the store's category column. Category is immutable after
    /// creation, so an unknown value is a data error, not a default.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TRADITIONAL" => Some(BandCategory::Traditional),
            "ALL_STAR" => Some(BandCategory::AllStar),
            _ => None,
        }
    }
}

/// A performing ensemble videos can be matched to. Read-only to the engine;
/// rows are seeded by an external admin process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Band {
    pub id: i64,
    /// Canonical display name (e.g., "Human Jukebox").
    pub name: String,
    /// School/organization name (e.g., "Southern University").
    pub school: String,
    pub category: BandCategory,
    /// Free-form keyword list, may be empty.
    #[serde(default)]
    pub keywords: Vec<String>,
}

// ============================================================================
// Video input
// ============================================================================

/// Classification input: the text fields harvested for one video.
/// Absent fields are treated as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoText {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub channel_title: Option<String>,
}

impl VideoText {
    /// Title, description and channel title joined into one searchable blob.
    /// Title comes first so the positional boost favors it.
    pub fn full_text(&self) -> String {
        let mut text = self.title.clone();
        if let Some(desc) = &self.description {
            text.push(' ');
            text.push_str(desc);
        }
        if let Some(channel) = &self.channel_title {
            text.push(' ');
            text.push_str(channel);
        }
        text
    }
}

/// A video row as read from the store (unassigned videos only).
#[derive(Debug, Clone)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub channel_title: Option<String>,
    pub from_verified_channel: bool,
}

impl VideoRecord {
    pub fn text(&self) -> VideoText {
        VideoText {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            channel_title: self.channel_title.clone(),
        }
    }
}

// ============================================================================
// Match candidates & outcomes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Produced by the general alias scorer.
    Alias,
    /// Produced by the named-event roster matcher.
    Event,
}

/// One (band, alias, score) triple for a given video text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub band_id: i64,
    /// The alias (or event name) that matched.
    pub alias: String,
    pub score: u32,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    HighSchool,
    MiddleSchool,
    PodcastShow,
    GenericContent,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::HighSchool => "high_school",
            ExclusionReason::MiddleSchool => "middle_school",
            ExclusionReason::PodcastShow => "podcast_show",
            ExclusionReason::GenericContent => "generic_content",
        }
    }
}

/// The pipeline's terminal result for one video. Exactly one variant applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassificationOutcome {
    Excluded { reason: ExclusionReason },
    NoMatch,
    LowConfidence { top_score: u32 },
    SingleMatch { band_id: i64, score: u32 },
    BattleMatch { band_id: i64, opponent_id: i64, score: u32 },
}

impl ClassificationOutcome {
    /// The store update this outcome requests: (band, opponent, score).
    /// None for outcomes that write nothing back.
    pub fn assignment(&self) -> Option<(i64, Option<i64>, u32)> {
        match self {
            ClassificationOutcome::SingleMatch { band_id, score } => {
                Some((*band_id, None, *score))
            }
            ClassificationOutcome::BattleMatch {
                band_id,
                opponent_id,
                score,
            } => Some((*band_id, Some(*opponent_id), *score)),
            _ => None,
        }
    }
}

// ============================================================================
// Run parameters & summary
// ============================================================================

/// Engine-wide default confidence threshold.
pub const DEFAULT_MIN_SCORE: u32 = 40;
/// Verified-creator-channel runs accept a lower bar: their uploads are
/// pre-vetted, so a short-alias-only match is acceptable.
pub const VERIFIED_CHANNELS_MIN_SCORE: u32 = 30;

/// Caller-supplied knobs for one classification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunParams {
    /// Minimum score the top candidate must reach (0-100 scale).
    pub min_score: u32,
    /// Cap on videos processed this run.
    pub limit: Option<i64>,
    /// Restrict matching to a single band.
    pub only_band_id: Option<i64>,
    /// Restrict the fetch to a single creator channel.
    pub only_channel: Option<String>,
    /// Restrict the fetch to videos from verified creator channels.
    pub only_verified: bool,
    /// Diagnostic runs may disable the exclusion filter entirely.
    pub skip_exclusions: bool,
    /// Preview mode: full pipeline and summary, zero store writes.
    pub preview: bool,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            limit: None,
            only_band_id: None,
            only_channel: None,
            only_verified: false,
            skip_exclusions: false,
            preview: false,
        }
    }
}

impl RunParams {
    /// Defaults for runs over already-verified creator channels: only their
    /// videos, at the lower confidence bar.
    pub fn verified_channels() -> Self {
        Self {
            min_score: VERIFIED_CHANNELS_MIN_SCORE,
            only_verified: true,
            ..Default::default()
        }
    }
}

/// In-memory aggregates for one run. Operator visibility only; not persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub processed: u64,
    pub excluded: u64,
    pub no_match: u64,
    pub low_confidence: u64,
    pub single_match: u64,
    pub battle_match: u64,
    pub write_errors: u64,
    /// Exclusion reason -> count.
    pub exclusion_reasons: HashMap<String, u64>,
    /// Band id -> number of videos matched to it this run.
    pub band_tallies: HashMap<i64, u64>,
}

impl RunSummary {
    pub fn new(run_id: String) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            finished_at: None,
            processed: 0,
            excluded: 0,
            no_match: 0,
            low_confidence: 0,
            single_match: 0,
            battle_match: 0,
            write_errors: 0,
            exclusion_reasons: HashMap::new(),
            band_tallies: HashMap::new(),
        }
    }

    pub fn record(&mut self, outcome: &ClassificationOutcome) {
        self.processed += 1;
        match outcome {
            ClassificationOutcome::Excluded { reason } => {
                self.excluded += 1;
                *self
                    .exclusion_reasons
                    .entry(reason.as_str().to_string())
                    .or_insert(0) += 1;
            }
            ClassificationOutcome::NoMatch => self.no_match += 1,
            ClassificationOutcome::LowConfidence { .. } => self.low_confidence += 1,
            ClassificationOutcome::SingleMatch { band_id, .. } => {
                self.single_match += 1;
                *self.band_tallies.entry(*band_id).or_insert(0) += 1;
            }
            ClassificationOutcome::BattleMatch {
                band_id,
                opponent_id,
                ..
            } => {
                self.battle_match += 1;
                *self.band_tallies.entry(*band_id).or_insert(0) += 1;
                *self.band_tallies.entry(*opponent_id).or_insert(0) += 1;
            }
        }
    }

    /// Top bands by match count, descending, band id as tie-break.
    pub fn top_bands(&self, n: usize) -> Vec<(i64, u64)> {
        let mut tallies: Vec<(i64, u64)> = self
            .band_tallies
            .iter()
            .map(|(id, count)| (*id, *count))
            .collect();
        tallies.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tallies.truncate(n);
        tallies
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}
