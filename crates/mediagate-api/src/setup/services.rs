//! Service and repository initialization

use crate::auth::identity::{AnonymousIdentityProvider, IdentityProvider, JwtIdentityProvider};
use crate::state::AppState;
use anyhow::{Context, Result};
use mediagate_core::Config;
use mediagate_db::{VideoRepository, VideoStore};
use mediagate_storage::create_media_host;
use sqlx::PgPool;
use std::sync::Arc;

pub fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let media_host =
        create_media_host(config.media_host()).context("Failed to create media host client")?;
    if let Some(host) = &media_host {
        tracing::info!(backend = host.name(), "Media host configured");
    }

    let video_store: Arc<dyn VideoStore> = Arc::new(VideoRepository::new(pool));

    let identity_provider = setup_identity_provider(config)?;

    Ok(Arc::new(AppState {
        media_host,
        video_store,
        identity_provider,
        access: config.access().clone(),
    }))
}

fn setup_identity_provider(config: &Config) -> Result<Arc<dyn IdentityProvider>> {
    let provider = JwtIdentityProvider::from_config(config.identity())
        .map_err(|e| anyhow::anyhow!("Failed to configure identity provider: {}", e))?;

    match provider {
        Some(provider) => {
            tracing::info!(
                jwks = config.identity().jwks_url.is_some(),
                static_key = config.identity().jwt_public_key.is_some(),
                "Session token verification enabled"
            );
            Ok(Arc::new(provider))
        }
        None => {
            tracing::warn!(
                "Neither CLERK_JWKS_URL nor CLERK_JWT_KEY is set; every caller is anonymous"
            );
            Ok(Arc::new(AnonymousIdentityProvider))
        }
    }
}
