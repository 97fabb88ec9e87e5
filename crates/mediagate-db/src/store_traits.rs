//! Repository trait abstractions
//!
//! Handlers hold an `Arc<dyn VideoStore>`; the Postgres repository is the production
//! implementation and tests substitute an in-memory one.

use async_trait::async_trait;
use mediagate_core::error::AppError;
use mediagate_core::models::{NewVideo, Video};

/// Storage operations for video metadata
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Insert one record and return it with store-generated fields filled in
    async fn create(&self, video: NewVideo) -> Result<Video, AppError>;

    /// All records, newest first
    async fn list_recent(&self) -> Result<Vec<Video>, AppError>;
}
