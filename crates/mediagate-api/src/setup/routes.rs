//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::auth::{access_gate_middleware, GateState};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use mediagate_core::Config;
use mediagate_infra::{request_id_middleware, request_span};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes, behind the access gate
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let gate_state = Arc::new(GateState::new(
        state.identity_provider.clone(),
        state.access.clone(),
    ));

    let app = api_routes(state)
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .layer(axum::middleware::from_fn_with_state(
            gate_state,
            access_gate_middleware,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_size_bytes()))
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(axum::middleware::from_fn(request_id_middleware));

    Ok(app)
}

/// Handler routes without the gate or outer layers.
pub fn api_routes(state: Arc<AppState>) -> Router<()> {
    Router::new()
        .route(
            "/api/image-upload",
            post(handlers::image_upload::upload_image),
        )
        .route(
            "/api/video-upload",
            post(handlers::video_upload::upload_video),
        )
        .route("/api/videos", get(handlers::videos::list_videos))
        .with_state(state)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any));
    }

    let origins = config
        .cors_origins()
        .iter()
        .map(|o| o.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(Any))
}
