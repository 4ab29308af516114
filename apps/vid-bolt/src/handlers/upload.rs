//! Upload handler

use axum::{extract::Multipart, extract::State, Json};
use tracing::info;
use vidlink_domain::Video;

use crate::{
    dto::video::{ErrorResponse, UploadRequest, UploadResponse},
    error::ApiError,
    AppState,
};

/// Multipart field carrying the video
const VIDEO_FIELD: &str = "video";

/// Fallback when the part declares no content type
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Handle video uploads
#[utoipa::path(
    post,
    path = "/upload/video",
    request_body(content = UploadRequest, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video uploaded successfully", body = UploadResponse),
        (status = 400, description = "Missing, malformed or rejected video", body = ErrorResponse),
        (status = 413, description = "Payload too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "videos"
)]
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut video = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let mimetype = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let data = field.bytes().await?;

        info!(filename = %filename, mimetype = %mimetype, size = data.len(), "Received video upload");
        video = Some(Video::new(filename, mimetype, data));
        break;
    }

    state.ingestion_service.process_video(video).await?;

    Ok(Json(UploadResponse::uploaded()))
}
