use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{extract::State, Json};
use mediagate_core::models::Video;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "Videos, newest first", body = [Video]),
        (status = 500, description = "Internal Server Error", body = String, content_type = "text/plain")
    )
)]
#[tracing::instrument(skip(state))]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Video>>, HttpAppError> {
    let videos = state.video_store.list_recent().await?;
    Ok(Json(videos))
}
