//! Mediagate Core Library
//!
//! This crate provides the domain models, error types, configuration, and constants
//! shared by the database, storage, and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{
    AccessConfig, AppConfig, BaseConfig, Config, IdentityConfig, MediaHostConfig,
    MediaHostCredentials,
};
pub use error::{AppError, ErrorMetadata, LogLevel};
