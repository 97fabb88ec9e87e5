use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use mediagate_core::AppError;
use serde::{Deserialize, Serialize};

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>, // session id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>, // authorized party (origin of the frontend)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

/// Authenticated caller. Attached to request extensions by the access gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub session_id: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: None,
        }
    }
}

impl From<SessionClaims> for Identity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            session_id: claims.sid,
        }
    }
}

// Read from extensions directly so handlers can also take Multipart
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Identity>().cloned().ok_or_else(|| {
            HttpAppError::from(AppError::Unauthorized(
                "No identity attached to request".to_string(),
            ))
        })
    }
}
