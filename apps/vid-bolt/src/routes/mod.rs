//! API routes

pub mod video;

use axum::{extract::DefaultBodyLimit, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    dto::video::{ErrorResponse, UploadRequest, UploadResponse},
    handlers, AppState,
};

/// Room left for multipart boundaries and part headers on top of the file size limit
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::upload::upload_handler,
        handlers::stream::stream_handler,
        health_handler
    ),
    components(
        schemas(UploadRequest, UploadResponse, ErrorResponse)
    ),
    tags(
        (name = "videos", description = "Video upload and streaming endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "VidBolt API",
        version = "0.1.0",
        description = "Video upload and range-aware streaming service for VidLink",
        contact(
            name = "VidLink Team"
        )
    )
)]
pub struct ApiDoc;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let max_file_size = state.ingestion_service.config().max_file_size_bytes;
    let body_limit = usize::try_from(max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(video::routes())
        .route("/health", axum::routing::get(health_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    ),
    tag = "health"
)]
async fn health_handler() -> &'static str {
    "OK"
}
