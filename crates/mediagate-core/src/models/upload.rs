use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response body of a successful image upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadResponse {
    pub public_id: String,
}

/// Optional text fields submitted alongside a video file.
///
/// Absent fields are empty strings. `original_size` is kept as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoUploadFields {
    pub title: String,
    pub description: String,
    pub original_size: String,
}
