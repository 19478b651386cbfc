//! Video Matcher Service (Rust)
//!
//! Responsibilities:
//! - Load and validate the matcher configuration (fatal on malformed input)
//! - Run the classification batch over unassigned videos at startup
//! - Optionally listen for run requests on the Redis bus
//! - Publish run summaries and periodic service heartbeats

use anyhow::Result;
use chrono::Utc;
use dotenv::dotenv;
use fifthquarter_rust_core::config::MatcherConfig;
use fifthquarter_rust_core::db::create_batch_pool;
use fifthquarter_rust_core::db::videos::{PgVideoStore, VideoStore};
use fifthquarter_rust_core::matching::pipeline::run_batch;
use fifthquarter_rust_core::models::{channels, RunParams, RunSummary};
use fifthquarter_rust_core::redis::RedisBus;
use futures_util::StreamExt;
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::time::Duration;

// Heartbeat constants
const HEARTBEAT_KEY_PREFIX: &str = "health:hb";
const HEARTBEAT_INTERVAL_SECS: u64 = 10;
const HEARTBEAT_TTL_SECS: u64 = 35;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
struct ServiceConfig {
    /// Path to the matcher configuration JSON.
    config_path: String,
    /// Keep running and accept run requests from the Redis bus.
    listen_for_runs: bool,
    /// This run covers verified creator channels (lower threshold default).
    verified_channels_run: bool,
    min_score: Option<u32>,
    max_videos: Option<i64>,
    only_band_id: Option<i64>,
    only_channel: Option<String>,
    skip_exclusions: bool,
    preview: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            config_path: env::var("MATCHER_CONFIG")
                .unwrap_or_else(|_| "config/matcher.json".to_string()),
            listen_for_runs: env_flag("LISTEN_FOR_RUNS"),
            verified_channels_run: env_flag("VERIFIED_CHANNELS_RUN"),
            min_score: env::var("MIN_MATCH_SCORE").ok().and_then(|v| v.parse().ok()),
            max_videos: env::var("MAX_VIDEOS").ok().and_then(|v| v.parse().ok()),
            only_band_id: env::var("ONLY_BAND_ID").ok().and_then(|v| v.parse().ok()),
            only_channel: env::var("ONLY_CHANNEL").ok().filter(|v| !v.is_empty()),
            skip_exclusions: env_flag("SKIP_EXCLUSIONS"),
            preview: env_flag("PREVIEW"),
        }
    }
}

impl ServiceConfig {
    fn run_params(&self) -> RunParams {
        let mut params = if self.verified_channels_run {
            RunParams::verified_channels()
        } else {
            RunParams::default()
        };
        if let Some(min_score) = self.min_score {
            params.min_score = min_score;
        }
        params.limit = self.max_videos;
        params.only_band_id = self.only_band_id;
        params.only_channel = self.only_channel.clone();
        params.skip_exclusions = self.skip_exclusions;
        params.preview = self.preview;
        params
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

// ============================================================================
// Bus messages
// ============================================================================

/// A run request from the bus: every field overrides the service default.
#[derive(Debug, Deserialize)]
struct RunRequest {
    #[serde(default)]
    min_score: Option<u32>,
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default)]
    only_band_id: Option<i64>,
    #[serde(default)]
    only_channel: Option<String>,
    #[serde(default)]
    skip_exclusions: Option<bool>,
    #[serde(default)]
    preview: Option<bool>,
}

impl RunRequest {
    fn apply_to(self, mut params: RunParams) -> RunParams {
        if let Some(min_score) = self.min_score {
            params.min_score = min_score;
        }
        if self.limit.is_some() {
            params.limit = self.limit;
        }
        if self.only_band_id.is_some() {
            params.only_band_id = self.only_band_id;
        }
        if self.only_channel.is_some() {
            params.only_channel = self.only_channel;
        }
        if let Some(skip) = self.skip_exclusions {
            params.skip_exclusions = skip;
        }
        if let Some(preview) = self.preview {
            params.preview = preview;
        }
        params
    }
}

#[derive(Debug, Serialize)]
struct Heartbeat {
    service: String,
    instance_id: String,
    status: String,
    started_at: String,
    timestamp: String,
    checks: HashMap<String, bool>,
    metrics: HashMap<String, f64>,
    version: Option<String>,
    hostname: Option<String>,
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    info!("Starting Video Matcher Service...");

    let service_config = ServiceConfig::default();

    // Fatal on malformed config: processing without it would silently build
    // incomplete alias sets.
    let matcher_config = MatcherConfig::load(&service_config.config_path)?;
    info!(
        "Loaded matcher config from {}: {} traditional entries, {} all-star entries",
        service_config.config_path,
        matcher_config.traditional.len(),
        matcher_config.all_star.len()
    );

    let pool = create_batch_pool().await?;
    let store = PgVideoStore::new(pool);
    let redis = RedisBus::new().await?;

    // Band names for the run-summary log lines.
    let band_names: HashMap<i64, String> = store
        .load_bands()
        .await?
        .into_iter()
        .map(|b| (b.id, b.name))
        .collect();
    info!("Loaded {} bands", band_names.len());

    // Spawn heartbeat task
    let heartbeat_bus = redis.clone();
    let started_at = Utc::now().to_rfc3339();
    tokio::spawn(async move {
        if let Err(e) = heartbeat_loop(heartbeat_bus, started_at).await {
            error!("Heartbeat loop exited: {}", e);
        }
    });

    let params = service_config.run_params();
    run_and_report(&store, &matcher_config, &params, &redis, &band_names).await;

    if !service_config.listen_for_runs {
        info!("LISTEN_FOR_RUNS disabled; exiting after initial batch");
        return Ok(());
    }

    let mut pubsub = redis.subscribe(channels::MATCHER_REQUESTS).await?;
    info!("Listening for run requests on {}", channels::MATCHER_REQUESTS);

    let mut stream = pubsub.on_message();
    while let Some(msg) = stream.next().await {
        let payload: Vec<u8> = match msg.get_payload() {
            Ok(p) => p,
            Err(e) => {
                warn!("Run request listener: failed to read payload: {}", e);
                continue;
            }
        };

        // IMPORTANT: Never crash the listener due to one bad message.
        let request: RunRequest = match serde_json::from_slice(&payload) {
            Ok(r) => r,
            Err(e) => {
                let preview = String::from_utf8_lossy(&payload);
                warn!(
                    "Run request: invalid JSON ({}). payload='{}'",
                    e,
                    preview.chars().take(200).collect::<String>()
                );
                continue;
            }
        };

        debug!("Run request received: {:?}", request);
        let params = request.apply_to(service_config.run_params());
        run_and_report(&store, &matcher_config, &params, &redis, &band_names).await;
    }

    Ok(())
}

// ============================================================================
// Batch execution & reporting
// ============================================================================

async fn run_and_report(
    store: &dyn VideoStore,
    config: &MatcherConfig,
    params: &RunParams,
    redis: &RedisBus,
    band_names: &HashMap<i64, String>,
) {
    match run_batch(store, config, params).await {
        Ok(summary) => {
            log_summary(&summary, band_names);
            if let Err(e) = redis.publish(channels::MATCHER_RESULTS, &summary).await {
                warn!("Failed to publish run summary: {}", e);
            }
        }
        Err(e) => error!("Classification run failed: {:#}", e),
    }
}

fn log_summary(summary: &RunSummary, band_names: &HashMap<i64, String>) {
    info!(
        "Run {} complete: processed={} single={} battle={} excluded={} no_match={} low_confidence={} write_errors={}",
        summary.run_id,
        summary.processed,
        summary.single_match,
        summary.battle_match,
        summary.excluded,
        summary.no_match,
        summary.low_confidence,
        summary.write_errors
    );
    for (reason, count) in &summary.exclusion_reasons {
        info!("  excluded[{}]: {}", reason, count);
    }
    for (band_id, count) in summary.top_bands(10) {
        let name = band_names
            .get(&band_id)
            .map(|n| n.as_str())
            .unwrap_or("<unknown band>");
        info!("  matched[{} #{}]: {}", name, band_id, count);
    }
}

// ============================================================================
// Heartbeat
// ============================================================================

/// Heartbeat loop - publishes periodic health status to Redis
async fn heartbeat_loop(bus: RedisBus, started_at: String) -> Result<()> {
    let instance_id = env::var("HOSTNAME").unwrap_or_else(|_| "video-matcher-rust-1".to_string());
    let version = env::var("BUILD_VERSION").ok();
    let hostname = hostname::get().ok().and_then(|h| h.into_string().ok());

    info!("Heartbeat loop started for {}", instance_id);

    loop {
        let now = Utc::now().to_rfc3339();

        let mut checks = HashMap::new();
        checks.insert("redis_ok".to_string(), true);

        let heartbeat = Heartbeat {
            service: "video_matcher_rust".to_string(),
            instance_id: instance_id.clone(),
            status: "healthy".to_string(),
            started_at: started_at.clone(),
            timestamp: now,
            checks,
            metrics: HashMap::new(),
            version: version.clone(),
            hostname: hostname.clone(),
        };

        let payload = serde_json::to_string(&heartbeat)?;
        let key = format!("{}:video_matcher_rust:{}", HEARTBEAT_KEY_PREFIX, instance_id);

        // SETEX for liveness
        bus.set_ex(&key, &payload, HEARTBEAT_TTL_SECS).await?;

        // Publish for real-time observability
        bus.publish(channels::HEARTBEATS, &heartbeat).await?;

        debug!("Heartbeat published: {}", key);

        tokio::time::sleep(Duration::from_secs(HEARTBEAT_INTERVAL_SECS)).await;
    }
}
