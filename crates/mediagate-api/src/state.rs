//! Application state shared by handlers.

use crate::auth::IdentityProvider;
use mediagate_core::{AccessConfig, AppError};
use mediagate_db::VideoStore;
use mediagate_storage::MediaHost;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// `None` when the media host credentials are incomplete
    pub media_host: Option<Arc<dyn MediaHost>>,
    pub video_store: Arc<dyn VideoStore>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub access: AccessConfig,
}

impl AppState {
    pub fn media_host(&self) -> Result<Arc<dyn MediaHost>, AppError> {
        self.media_host.clone().ok_or_else(|| {
            AppError::Configuration("Media host credentials are not configured".to_string())
        })
    }
}
