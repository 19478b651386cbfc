//! Band matching engine.
//!
//! This module provides:
//! - Alias table construction from band records plus matcher configuration
//! - The confidence scorer for free-text video metadata
//! - Exclusion filtering for off-topic uploads
//! - Named-event roster matching (overrides the general scorer)
//! - Head-to-head ("battle") detection
//! - The classification pipeline every caller goes through
//!
//! Scoring constants live in exactly one place (`scorer`); every caller is
//! parameterized by `RunParams` instead of re-deriving thresholds.

pub mod alias;
pub mod battle;
pub mod events;
pub mod exclusion;
pub mod pipeline;
pub mod scorer;

pub use alias::{AliasTable, BandAliases};
pub use exclusion::ExclusionFilter;
pub use pipeline::Classifier;
