use crate::{CloudinaryClient, MediaHost, MediaHostResult};
use mediagate_core::MediaHostConfig;
use std::sync::Arc;
use std::time::Duration;

/// Create the media host client from configuration.
///
/// Returns `Ok(None)` when the credentials are incomplete; upload requests then
/// fail with a configuration error instead of the server refusing to start.
pub fn create_media_host(config: &MediaHostConfig) -> MediaHostResult<Option<Arc<dyn MediaHost>>> {
    let Some(credentials) = config.credentials() else {
        tracing::warn!(
            "Cloudinary credentials incomplete (CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY, CLOUDINARY_API_SECRET); uploads will be rejected"
        );
        return Ok(None);
    };

    let client = CloudinaryClient::new(
        credentials,
        config.api_base_url.clone(),
        Duration::from_secs(config.timeout_secs),
    )?;

    tracing::info!(
        cloud_name = %config.cloud_name.as_deref().unwrap_or_default(),
        "Cloudinary media host configured"
    );

    Ok(Some(Arc::new(client)))
}
