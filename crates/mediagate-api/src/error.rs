//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Errors render as a plain-text
//! body carrying the client message of the `AppError` variant; the internal
//! message only reaches the logs. Every error is logged exactly once, here,
//! under the handler's context message when one was attached.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use mediagate_core::{AppError, ErrorMetadata, LogLevel};
use mediagate_storage::MediaHostError;

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rule: both IntoResponse and AppError are foreign to this crate)
#[derive(Debug)]
pub struct HttpAppError {
    pub error: AppError,
    context: Option<&'static str>,
}

impl HttpAppError {
    /// Log message used for this error instead of the generic one.
    pub fn with_context(mut self, context: &'static str) -> Self {
        self.context = Some(context);
        self
    }

    pub fn context(&self) -> Option<&'static str> {
        self.context
    }
}

impl From<AppError> for HttpAppError {
    fn from(error: AppError) -> Self {
        HttpAppError {
            error,
            context: None,
        }
    }
}

impl From<MediaHostError> for HttpAppError {
    fn from(err: MediaHostError) -> Self {
        AppError::from(err).into()
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
        .into()
    }
}

fn log_error(error: &AppError, context: Option<&'static str>) {
    let error_type = error.error_type();
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            let message = context.unwrap_or("Request rejected");
            tracing::debug!(error = %error, error_type = error_type, code = code, "{}", message);
        }
        LogLevel::Warn => {
            let message = context.unwrap_or("Request failed");
            tracing::warn!(error = %error, error_type = error_type, code = code, "{}", message);
        }
        LogLevel::Error => {
            let message = context.unwrap_or("Request failed");
            tracing::error!(
                error = %error.detailed_message(),
                error_type = error_type,
                code = code,
                "{}",
                message
            );
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.error;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error, self.context);

        let mut response = Response::new(Body::from(app_error.client_message()));
        *response.status_mut() = status;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}
