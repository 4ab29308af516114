//! Video routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::{
    handlers::{stream::stream_handler, upload::upload_handler},
    AppState,
};

/// Create video upload and streaming routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload/video", post(upload_handler))
        .route("/static/video/:filename", get(stream_handler))
}
