//! Video/band store access.
//!
//! The engine reads band rows and unassigned video rows, and writes exactly
//! one update per classified video: band assignment, opponent assignment
//! (battles only) and the match score. The update is idempotent: re-running
//! an unchanged video yields the same outcome and the same field values.

use crate::models::{Band, BandCategory, RunParams, VideoRecord};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

/// Store boundary used by the batch runner. Implemented by Postgres in
/// production and by an in-memory double in tests.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// All band rows, in stable id order. Band declaration order feeds the
    /// scorer's tie-break, so ordering here must be deterministic.
    async fn load_bands(&self) -> Result<Vec<Band>>;

    /// Unassigned videos honoring the run's limit and channel restriction.
    async fn fetch_unassigned(&self, params: &RunParams) -> Result<Vec<VideoRecord>>;

    /// Apply one classification result to one video row.
    async fn apply_outcome(
        &self,
        video_id: &str,
        band_id: i64,
        opponent_id: Option<i64>,
        score: u32,
    ) -> Result<()>;
}

pub struct PgVideoStore {
    pool: PgPool,
}

impl PgVideoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn load_bands(&self) -> Result<Vec<Band>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, school, category, keywords
            FROM bands
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to load band rows")?;

        let mut bands = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i64 = row.try_get("id")?;
            let category: String = row.try_get("category")?;
            let category = BandCategory::parse(&category)
                .ok_or_else(|| anyhow!("band {} has unknown category '{}'", id, category))?;
            bands.push(Band {
                id,
                name: row.try_get("name")?,
                school: row.try_get("school")?,
                category,
                keywords: row
                    .try_get::<Option<Vec<String>>, _>("keywords")?
                    .unwrap_or_default(),
            });
        }
        Ok(bands)
    }

    async fn fetch_unassigned(&self, params: &RunParams) -> Result<Vec<VideoRecord>> {
        let limit = params.limit.unwrap_or(i64::MAX);

        let rows = sqlx::query(
            r#"
            SELECT id, title, description, channel_title, from_verified_channel
            FROM videos
            WHERE band_id IS NULL
              AND ($1::text IS NULL OR channel_title = $1)
              AND ($2::bool = false OR from_verified_channel)
            ORDER BY id
            LIMIT $3
            "#,
        )
        .bind(params.only_channel.as_deref())
        .bind(params.only_verified)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch unassigned videos")?;

        let mut videos = Vec::with_capacity(rows.len());
        for row in rows {
            videos.push(VideoRecord {
                id: row.try_get("id")?,
                title: row
                    .try_get::<Option<String>, _>("title")?
                    .unwrap_or_default(),
                description: row.try_get("description")?,
                channel_title: row.try_get("channel_title")?,
                from_verified_channel: row
                    .try_get::<Option<bool>, _>("from_verified_channel")?
                    .unwrap_or(false),
            });
        }
        Ok(videos)
    }

    async fn apply_outcome(
        &self,
        video_id: &str,
        band_id: i64,
        opponent_id: Option<i64>,
        score: u32,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE videos
            SET band_id = $2,
                opponent_band_id = $3,
                match_score = $4,
                matched_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(video_id)
        .bind(band_id)
        .bind(opponent_id)
        .bind(score as i32)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to update video {}", video_id))?;
        Ok(())
    }
}
