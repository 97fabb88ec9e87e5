use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::upload::VideoUploadFields;

/// Persisted video metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub public_id: String,
    pub original_size: String,
    pub compressed_size: String,
    pub duration: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a new video row; the store fills in id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub public_id: String,
    pub original_size: String,
    pub compressed_size: String,
    pub duration: f64,
}

impl NewVideo {
    /// Build the row from the submitted form fields and what the media host reported.
    pub fn from_upload(
        fields: VideoUploadFields,
        public_id: String,
        bytes: u64,
        duration: Option<f64>,
    ) -> Self {
        Self {
            title: fields.title,
            description: fields.description,
            public_id,
            original_size: fields.original_size,
            compressed_size: bytes.to_string(),
            duration: duration.unwrap_or(0.0),
        }
    }
}
