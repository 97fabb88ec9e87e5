//! Configuration module
//!
//! This module provides configuration structures for the API and its collaborators:
//! server settings, database, media host credentials, identity verification, and
//! the route tables used by the access gate.

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::constants::{
    API_PREFIX, DEFAULT_CLOUDINARY_API_BASE_URL, DEFAULT_LANDING_PATH, DEFAULT_PUBLIC_API_ROUTES,
    DEFAULT_PUBLIC_ROUTES, DEFAULT_SIGN_IN_PATH,
};

// Common constants
const SERVER_PORT: u16 = 3000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 100;
const MEDIA_HOST_TIMEOUT_SECS: u64 = 120;
const JWKS_CACHE_TTL_SECS: i64 = 3600;

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub max_upload_size_bytes: usize,
    pub environment: String,
    pub log_format: String,
}

/// Media host (Cloudinary) settings.
///
/// Credentials stay optional here: a missing value is reported per request,
/// not at startup.
#[derive(Clone, Debug)]
pub struct MediaHostConfig {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub api_base_url: String,
    pub timeout_secs: u64,
}

/// Complete set of media host credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaHostCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl Debug for MediaHostCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaHostCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl MediaHostConfig {
    /// Returns the credentials only when all three values are configured.
    pub fn credentials(&self) -> Option<MediaHostCredentials> {
        Some(MediaHostCredentials {
            cloud_name: self.cloud_name.clone()?,
            api_key: self.api_key.clone()?,
            api_secret: self.api_secret.clone()?,
        })
    }
}

/// Session token verification settings
#[derive(Clone, Debug)]
pub struct IdentityConfig {
    /// JWKS endpoint of the authentication provider
    pub jwks_url: Option<String>,
    /// PEM-encoded public key for networkless verification
    pub jwt_public_key: Option<String>,
    pub jwks_cache_ttl_secs: i64,
    /// Allowed `azp` claim values; empty accepts any
    pub authorized_parties: Vec<String>,
}

impl IdentityConfig {
    pub fn is_configured(&self) -> bool {
        self.jwks_url.is_some() || self.jwt_public_key.is_some()
    }
}

/// Route tables and redirect targets used by the access gate
#[derive(Clone, Debug)]
pub struct AccessConfig {
    pub public_routes: Vec<String>,
    pub public_api_routes: Vec<String>,
    pub sign_in_path: String,
    pub landing_path: String,
    pub api_prefix: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            public_routes: DEFAULT_PUBLIC_ROUTES.iter().map(|s| s.to_string()).collect(),
            public_api_routes: DEFAULT_PUBLIC_API_ROUTES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_string(),
            landing_path: DEFAULT_LANDING_PATH.to_string(),
            api_prefix: API_PREFIX.to_string(),
        }
    }
}

/// Full application configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base: BaseConfig,
    pub database_url: String,
    pub media_host: MediaHostConfig,
    pub identity: IdentityConfig,
    pub access: AccessConfig,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AppConfig>);

impl Config {
    fn as_app(&self) -> &AppConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AppConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_app().base.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.as_app().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_app().base.cors_origins
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_app().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_app().base.db_timeout_seconds
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_app().base.max_upload_size_bytes
    }

    pub fn environment(&self) -> &str {
        &self.as_app().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.as_app().base.log_format
    }

    pub fn database_url(&self) -> &str {
        &self.as_app().database_url
    }

    pub fn media_host(&self) -> &MediaHostConfig {
        &self.as_app().media_host
    }

    pub fn identity(&self) -> &IdentityConfig {
        &self.as_app().identity
    }

    pub fn access(&self) -> &AccessConfig {
        &self.as_app().access
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins: parse_list(&env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string())),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            max_upload_size_bytes: megabytes_to_bytes(env_or(
                "MAX_UPLOAD_SIZE_MB",
                MAX_UPLOAD_SIZE_MB,
            ))?,
            environment,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase(),
        };

        let media_host = MediaHostConfig {
            cloud_name: non_empty_env("CLOUDINARY_CLOUD_NAME")
                .or_else(|| non_empty_env("NEXT_PUBLIC_CLOUDINARY_CLOUD_NAME")),
            api_key: non_empty_env("CLOUDINARY_API_KEY"),
            api_secret: non_empty_env("CLOUDINARY_API_SECRET"),
            api_base_url: env::var("CLOUDINARY_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_CLOUDINARY_API_BASE_URL.to_string()),
            timeout_secs: env_or("CLOUDINARY_TIMEOUT_SECS", MEDIA_HOST_TIMEOUT_SECS),
        };

        let identity = IdentityConfig {
            jwks_url: non_empty_env("CLERK_JWKS_URL"),
            jwt_public_key: non_empty_env("CLERK_JWT_KEY"),
            jwks_cache_ttl_secs: env_or("CLERK_JWKS_CACHE_TTL_SECS", JWKS_CACHE_TTL_SECS),
            authorized_parties: env::var("CLERK_AUTHORIZED_PARTIES")
                .map(|s| parse_list(&s))
                .unwrap_or_default(),
        };

        let defaults = AccessConfig::default();
        let access = AccessConfig {
            public_routes: env::var("PUBLIC_ROUTES")
                .map(|s| parse_list(&s))
                .unwrap_or(defaults.public_routes),
            public_api_routes: env::var("PUBLIC_API_ROUTES")
                .map(|s| parse_list(&s))
                .unwrap_or(defaults.public_api_routes),
            sign_in_path: env::var("SIGN_IN_PATH").unwrap_or(defaults.sign_in_path),
            landing_path: env::var("LANDING_PATH").unwrap_or(defaults.landing_path),
            api_prefix: defaults.api_prefix,
        };

        let config = AppConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            media_host,
            identity,
            access,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        for path in [&self.access.sign_in_path, &self.access.landing_path] {
            if !path.starts_with('/') {
                return Err(anyhow::anyhow!(
                    "Redirect target '{}' must be an absolute path",
                    path
                ));
            }
        }

        Ok(())
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

/// Read an env var, treating an empty value as unset.
fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn megabytes_to_bytes(megabytes: usize) -> Result<usize, anyhow::Error> {
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large: {}", megabytes))
}

/// Split a comma-separated value, dropping blanks.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
