//! Application setup and initialization
//!
//! Startup is split into configuration validation, database, services and
//! routes so tests can build the router from in-memory parts.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use mediagate_core::Config;
use mediagate_infra::LogFormat;
use sqlx::PgPool;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router, PgPool)> {
    let log_format = config
        .log_format()
        .parse::<LogFormat>()
        .map_err(|e| anyhow::anyhow!(e))?;
    mediagate_infra::init_telemetry(log_format, env!("CARGO_PKG_NAME"), config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    validation::validate_config(&config).context("Configuration validation failed")?;
    tracing::info!("Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;

    let state = services::initialize_services(&config, pool.clone())?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router, pool))
}
