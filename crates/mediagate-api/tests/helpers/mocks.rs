//! In-memory implementations of the collaborator traits.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use chrono::Utc;
use mediagate_api::auth::{Identity, IdentityProvider};
use mediagate_core::models::{NewVideo, Video};
use mediagate_core::AppError;
use mediagate_db::VideoStore;
use mediagate_storage::{MediaHost, MediaHostError, MediaHostResult, UploadOptions, UploadResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// Treats `Authorization: Bearer <user id>` as a verified session.
/// The token `invalid` simulates a verification failure.
pub struct MockIdentityProvider;

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Identity>, AppError> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "));

        match token {
            None => Ok(None),
            Some("invalid") => Err(AppError::Unauthorized("Invalid token".to_string())),
            Some(user_id) => Ok(Some(Identity::new(user_id))),
        }
    }
}

pub struct MockMediaHost {
    result: Option<UploadResult>,
    calls: AtomicUsize,
    uploads: Mutex<Vec<(usize, UploadOptions)>>,
}

impl MockMediaHost {
    pub fn returning(result: UploadResult) -> Self {
        Self {
            result: Some(result),
            calls: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::returning(upload_result("next-cloudinary-uploads/sample", 2048, None))
    }

    pub fn failing() -> Self {
        Self {
            result: None,
            calls: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// (buffer size, options) of each upload call
    pub fn uploads(&self) -> Vec<(usize, UploadOptions)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaHost for MockMediaHost {
    async fn upload(
        &self,
        data: Vec<u8>,
        options: &UploadOptions,
    ) -> MediaHostResult<UploadResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.uploads
            .lock()
            .unwrap()
            .push((data.len(), options.clone()));

        self.result.clone().ok_or_else(|| MediaHostError::Rejected {
            status: 401,
            message: "Invalid Signature".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

pub fn upload_result(public_id: &str, bytes: u64, duration: Option<f64>) -> UploadResult {
    UploadResult {
        public_id: public_id.to_string(),
        bytes,
        duration,
        secure_url: None,
        resource_type: None,
        format: None,
    }
}

pub struct InMemoryVideoStore {
    videos: Mutex<Vec<Video>>,
    fail: bool,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self {
            videos: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            videos: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn seed(&self, video: Video) {
        self.videos.lock().unwrap().push(video);
    }

    pub fn all(&self) -> Vec<Video> {
        self.videos.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn create(&self, video: NewVideo) -> Result<Video, AppError> {
        if self.fail {
            return Err(AppError::Persistence(sqlx::Error::PoolTimedOut));
        }

        let now = Utc::now();
        let record = Video {
            id: Uuid::new_v4(),
            title: video.title,
            description: video.description,
            public_id: video.public_id,
            original_size: video.original_size,
            compressed_size: video.compressed_size,
            duration: video.duration,
            created_at: now,
            updated_at: now,
        };
        self.videos.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_recent(&self) -> Result<Vec<Video>, AppError> {
        if self.fail {
            return Err(AppError::Persistence(sqlx::Error::PoolTimedOut));
        }

        let mut videos = self.all();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }
}
