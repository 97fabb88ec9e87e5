//! Error types module
//!
//! All handler-level failures are unified under `AppError`. Each variant describes
//! how it is presented over HTTP through the `ErrorMetadata` trait; the API crate
//! turns that into a response.
//!
//! The `Persistence` variant wraps `sqlx::Error` when the `sqlx` feature is enabled.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected failures such as a missing form field
    Debug,
    /// Caller or operator mistakes worth noticing
    Warn,
    /// Unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "PERSISTENCE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether the internal message must stay out of responses
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Media host error: {0}")]
    Upstream(String),

    #[cfg(feature = "sqlx")]
    #[error("Persistence error: {0}")]
    Persistence(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Persistence(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// (http_status, error_code, sensitive, log_level) per variant.
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::Unauthorized(_) => (401, "UNAUTHORIZED", false, LogLevel::Debug),
        AppError::Configuration(_) => (500, "CONFIGURATION_ERROR", true, LogLevel::Error),
        AppError::BadRequest(_) => (400, "BAD_REQUEST", false, LogLevel::Debug),
        AppError::Upstream(_) => (500, "UPSTREAM_ERROR", true, LogLevel::Error),
        AppError::Persistence(_) => (500, "PERSISTENCE_ERROR", true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for logging
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Configuration(_) => "Configuration",
            AppError::BadRequest(_) => "BadRequest",
            AppError::Upstream(_) => "Upstream",
            AppError::Persistence(_) => "Persistence",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Unauthorized(_) => "Unauthorized".to_string(),
            AppError::Configuration(_) => "Cloudinary credentials not found".to_string(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::Upstream(_)
            | AppError::Persistence(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => INTERNAL_SERVER_ERROR.to_string(),
        }
    }
}
