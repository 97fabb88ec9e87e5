//! Media host abstraction trait
//!
//! This module defines the MediaHost trait that the upload handlers talk to.

use async_trait::async_trait;
use mediagate_core::AppError;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Media host operation errors
#[derive(Debug, Error)]
pub enum MediaHostError {
    #[error("Request to media host failed: {0}")]
    RequestFailed(String),

    #[error("Media host rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid media host response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for media host operations
pub type MediaHostResult<T> = Result<T, MediaHostError>;

impl From<MediaHostError> for AppError {
    fn from(err: MediaHostError) -> Self {
        match err {
            MediaHostError::ConfigError(msg) => AppError::Configuration(msg),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

/// Kind of asset being uploaded; selects the upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Image,
    Video,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Video => "video",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Incoming transformation applied by the host before storing the asset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transformation {
    pub quality: Option<String>,
    pub fetch_format: Option<String>,
}

impl Transformation {
    /// Automatic quality, re-encoded to mp4.
    pub fn compressed_mp4() -> Self {
        Self {
            quality: Some("auto".to_string()),
            fetch_format: Some("mp4".to_string()),
        }
    }

    /// Render in the host's wire form: `key_value` components sorted by key,
    /// joined with commas. Returns `None` when nothing is set.
    pub fn to_param(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(format) = &self.fetch_format {
            parts.push(format!("f_{}", format));
        }
        if let Some(quality) = &self.quality {
            parts.push(format!("q_{}", quality));
        }
        parts.sort();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(","))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub folder: String,
    pub resource_type: ResourceType,
    pub transformation: Option<Transformation>,
}

impl UploadOptions {
    pub fn image(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            resource_type: ResourceType::Image,
            transformation: None,
        }
    }

    pub fn video(folder: impl Into<String>, transformation: Transformation) -> Self {
        Self {
            folder: folder.into(),
            resource_type: ResourceType::Video,
            transformation: Some(transformation),
        }
    }
}

/// Subset of the host's upload response used by the handlers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResult {
    pub public_id: String,
    pub bytes: u64,
    /// Present for video and audio assets only.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub secure_url: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

/// Media host abstraction
///
/// Implementations take the whole file buffer and hand back the host's
/// description of the stored asset.
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, data: Vec<u8>, options: &UploadOptions)
        -> MediaHostResult<UploadResult>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
