//! Video repository: inserts and lists rows of the `videos` table.

use async_trait::async_trait;
use chrono::Utc;
use mediagate_core::models::{NewVideo, Video};
use mediagate_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::store_traits::VideoStore;

const VIDEO_COLUMNS: &str = "id, title, description, public_id, original_size, \
     compressed_size, duration, created_at, updated_at";

/// Postgres-backed video metadata store.
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for VideoRepository {
    #[tracing::instrument(skip(self, video), fields(db.table = "videos", public_id = %video.public_id))]
    async fn create(&self, video: NewVideo) -> Result<Video, AppError> {
        // Returned to the pool when `conn` drops, on every exit path
        let mut conn = self.pool.acquire().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to acquire database connection");
            AppError::Persistence(e)
        })?;

        let now = Utc::now();
        let query = format!(
            r#"
            INSERT INTO videos (id, title, description, public_id, original_size,
                                compressed_size, duration, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {VIDEO_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<Postgres, Video>(&query)
            .bind(Uuid::new_v4())
            .bind(&video.title)
            .bind(&video.description)
            .bind(&video.public_id)
            .bind(&video.original_size)
            .bind(&video.compressed_size)
            .bind(video.duration)
            .bind(now)
            .fetch_one(&mut *conn)
            .await?;

        tracing::debug!(video_id = %row.id, "Video record created");
        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos"))]
    async fn list_recent(&self) -> Result<Vec<Video>, AppError> {
        let query = format!("SELECT {VIDEO_COLUMNS} FROM videos ORDER BY created_at DESC");
        let rows = sqlx::query_as::<Postgres, Video>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
