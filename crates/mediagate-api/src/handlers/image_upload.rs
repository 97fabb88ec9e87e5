use crate::auth::Identity;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_upload_form;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use mediagate_core::constants::IMAGE_UPLOAD_FOLDER;
use mediagate_core::models::ImageUploadResponse;
use mediagate_storage::UploadOptions;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/image-upload",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored by the media host", body = ImageUploadResponse),
        (status = 400, description = "No file found uploaded", body = String, content_type = "text/plain"),
        (status = 401, description = "Unauthorized", body = String, content_type = "text/plain"),
        (status = 500, description = "Missing credentials or upload failure", body = String, content_type = "text/plain")
    )
)]
#[tracing::instrument(skip(state, identity, multipart), fields(user_id = %identity.user_id))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageUploadResponse>, HttpAppError> {
    let media_host = state.media_host()?;
    let form = extract_upload_form(multipart).await?;

    tracing::debug!(
        size = form.data.len(),
        file_name = ?form.file_name,
        content_type = ?form.content_type,
        "Uploading image"
    );

    let result = media_host
        .upload(form.data, &UploadOptions::image(IMAGE_UPLOAD_FOLDER))
        .await
        .map_err(|e| HttpAppError::from(e).with_context("Image upload failed"))?;

    tracing::info!(public_id = %result.public_id, bytes = result.bytes, "Image uploaded");

    Ok(Json(ImageUploadResponse {
        public_id: result.public_id,
    }))
}
