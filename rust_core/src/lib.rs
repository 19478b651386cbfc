//! FifthQuarter Core - band video classification.
//!
//! This library provides:
//! - Alias table construction from band records plus matcher configuration
//! - Confidence-scored matching of video metadata against known bands
//! - Exclusion filtering for off-topic uploads (school level, talk shows,
//!   generic instructional content)
//! - Named-event rosters and head-to-head ("battle") detection
//! - The single classification pipeline every caller depends on
//! - Postgres store access and Redis bus helpers for the services

pub mod config;
pub mod db;
pub mod matching;
pub mod models;
pub mod redis;
pub mod utils;

pub use matching::pipeline::{run_batch, Classifier};
pub use matching::{AliasTable, BandAliases, ExclusionFilter};
