//! Configuration validation
//!
//! Checks run once at startup. Incomplete media host credentials only warn:
//! upload requests report them individually.

use anyhow::Result;
use mediagate_core::Config;

pub fn validate_config(config: &Config) -> Result<()> {
    let is_production = config.is_production();

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.max_upload_size_bytes() == 0 {
        return Err(anyhow::anyhow!("Max upload size cannot be 0"));
    }

    if is_production && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Set specific allowed origins via CORS_ORIGINS."
        ));
    }

    if is_production && !config.identity().is_configured() {
        return Err(anyhow::anyhow!(
            "No session verification configured in production - set CLERK_JWKS_URL or CLERK_JWT_KEY"
        ));
    }

    if config.media_host().credentials().is_none() {
        tracing::warn!(
            "Cloudinary credentials incomplete - image and video uploads will fail until configured"
        );
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}
