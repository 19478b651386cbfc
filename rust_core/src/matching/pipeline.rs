//! The classification pipeline.
//!
//! One fixed evaluation order per video, terminal on the first applicable
//! state: exclusion check -> event roster or general scorer -> confidence
//! threshold -> battle check. Every caller goes through this module with its
//! own `RunParams` instead of re-deriving scoring constants.
//!
//! Classification is pure: no store access, no shared mutable state. The
//! service runner applies store updates for match outcomes and accumulates
//! the run summary.

use super::alias::AliasTable;
use super::{battle, events, exclusion::ExclusionFilter, scorer};
use crate::config::{ConfigError, MatcherConfig};
use crate::db::retry::execute_with_retry;
use crate::db::videos::VideoStore;
use crate::models::{
    Band, ClassificationOutcome, RunParams, RunSummary, VideoRecord, VideoText,
};
use crate::utils::text::normalize;
use anyhow::Result;
use rayon::prelude::*;
use uuid::Uuid;

/// Attempts per store write before the video is counted as a write error.
const WRITE_ATTEMPTS: u32 = 3;

/// A fully built classifier for one run: the alias table plus the compiled
/// exclusion filter. Build once per batch; bands change rarely.
pub struct Classifier {
    table: AliasTable,
    exclusions: ExclusionFilter,
}

impl Classifier {
    pub fn new(bands: &[Band], config: &MatcherConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            table: AliasTable::build(bands, config),
            exclusions: ExclusionFilter::from_patterns(&config.exclusions)?,
        })
    }

    pub fn alias_table(&self) -> &AliasTable {
        &self.table
    }

    /// Classify one video. Deterministic for fixed bands, config and text.
    pub fn classify(&self, video: &VideoText, params: &RunParams) -> ClassificationOutcome {
        let raw = video.full_text();
        let lower = raw.to_lowercase();

        if !params.skip_exclusions {
            if let Some(reason) = self.exclusions.check(&raw) {
                return ClassificationOutcome::Excluded { reason };
            }
        }

        // A recognized event's roster takes priority over the general scorer.
        let mut candidates = events::match_events(&lower, &self.table);
        if candidates.is_empty() {
            candidates = scorer::score_text(&normalize(&raw), &self.table);
        }
        if let Some(only) = params.only_band_id {
            candidates.retain(|c| c.band_id == only);
        }

        let Some(top) = candidates.first().cloned() else {
            return ClassificationOutcome::NoMatch;
        };
        if top.score < params.min_score {
            return ClassificationOutcome::LowConfidence {
                top_score: top.score,
            };
        }

        // A battle needs head-to-head phrasing AND a second band that clears
        // the threshold on its own.
        if battle::is_battle(&lower) {
            let opponent = candidates
                .iter()
                .find(|c| c.band_id != top.band_id && c.score >= params.min_score);
            if let Some(opponent) = opponent {
                return ClassificationOutcome::BattleMatch {
                    band_id: top.band_id,
                    opponent_id: opponent.band_id,
                    score: top.score,
                };
            }
        }

        ClassificationOutcome::SingleMatch {
            band_id: top.band_id,
            score: top.score,
        }
    }

    /// Classify a batch in parallel. Pure per video, so ordering cannot
    /// change any outcome; results are returned in input order.
    pub fn classify_batch(
        &self,
        videos: &[VideoRecord],
        params: &RunParams,
    ) -> Vec<ClassificationOutcome> {
        videos
            .par_iter()
            .map(|video| self.classify(&video.text(), params))
            .collect()
    }
}

/// Run one full batch: load bands, build the classifier, classify every
/// unassigned video and apply one store update per match outcome.
///
/// Scoring runs in parallel; writes are applied sequentially and retried on
/// transient errors. A video whose write ultimately fails is logged and
/// counted, and the batch continues. Preview runs skip every write.
pub async fn run_batch(
    store: &dyn VideoStore,
    config: &MatcherConfig,
    params: &RunParams,
) -> Result<RunSummary> {
    let bands = store.load_bands().await?;
    config.warn_near_misses(&bands);
    let classifier = Classifier::new(&bands, config)?;

    let videos = store.fetch_unassigned(params).await?;
    log::info!(
        "classifying {} unassigned videos against {} bands (min_score={}, preview={})",
        videos.len(),
        bands.len(),
        params.min_score,
        params.preview
    );

    let outcomes = classifier.classify_batch(&videos, params);

    let mut summary = RunSummary::new(Uuid::new_v4().to_string());
    for (video, outcome) in videos.iter().zip(&outcomes) {
        summary.record(outcome);

        let Some((band_id, opponent_id, score)) = outcome.assignment() else {
            continue;
        };
        if params.preview {
            continue;
        }

        let write = execute_with_retry(
            || async { store.apply_outcome(&video.id, band_id, opponent_id, score).await },
            WRITE_ATTEMPTS,
        )
        .await;
        if let Err(e) = write {
            log::error!("failed to update video {}: {}", video.id, e);
            summary.write_errors += 1;
        }
    }

    summary.finish();
    Ok(summary)
}
