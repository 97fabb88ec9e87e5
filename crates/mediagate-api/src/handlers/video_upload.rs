use crate::auth::Identity;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::extract_upload_form;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use mediagate_core::constants::VIDEO_UPLOAD_FOLDER;
use mediagate_core::models::{NewVideo, Video};
use mediagate_storage::{Transformation, UploadOptions};
use std::sync::Arc;

const UPLOAD_FAILED: &str = "Video upload failed";

#[utoipa::path(
    post,
    path = "/api/video-upload",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video stored and recorded", body = Video),
        (status = 400, description = "No file found uploaded", body = String, content_type = "text/plain"),
        (status = 401, description = "Unauthorized", body = String, content_type = "text/plain"),
        (status = 500, description = "Missing credentials, upload or persistence failure", body = String, content_type = "text/plain")
    )
)]
#[tracing::instrument(skip(state, identity, multipart), fields(user_id = %identity.user_id))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Video>, HttpAppError> {
    let media_host = state.media_host()?;
    let form = extract_upload_form(multipart).await?;

    tracing::debug!(
        size = form.data.len(),
        title = %form.fields.title,
        original_size = %form.fields.original_size,
        "Uploading video"
    );

    let options = UploadOptions::video(VIDEO_UPLOAD_FOLDER, Transformation::compressed_mp4());
    let result = media_host
        .upload(form.data, &options)
        .await
        .map_err(|e| HttpAppError::from(e).with_context(UPLOAD_FAILED))?;

    let new_video = NewVideo::from_upload(
        form.fields,
        result.public_id,
        result.bytes,
        result.duration,
    );

    let video = state
        .video_store
        .create(new_video)
        .await
        .map_err(|e| HttpAppError::from(e).with_context(UPLOAD_FAILED))?;

    tracing::info!(
        video_id = %video.id,
        public_id = %video.public_id,
        compressed_size = %video.compressed_size,
        "Video uploaded"
    );

    Ok(Json(video))
}
