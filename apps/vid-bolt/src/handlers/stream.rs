//! Streaming handler

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use tracing::debug;
use vidlink_domain::{RangeRequest, VideoError, VideoSource};

use crate::{dto::video::ErrorResponse, error::ApiError, AppState};

/// Response header reporting whether the cache served the bytes
pub const X_CACHE: &str = "x-cache";

/// Stream a video, honoring a single byte range
#[utoipa::path(
    get,
    path = "/static/video/{filename}",
    params(
        ("filename" = String, Path, description = "Filename used at upload"),
        ("Range" = Option<String>, Header, description = "Byte range, e.g. bytes=0-1023")
    ),
    responses(
        (status = 200, description = "Whole video"),
        (status = 206, description = "Requested byte range"),
        (status = 400, description = "Malformed Range header", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 416, description = "Range not satisfiable", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "videos"
)]
pub async fn stream_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let range_header = headers
        .get(header::RANGE)
        .map(|value| {
            value.to_str().map_err(|_| {
                VideoError::InvalidRangeFormat("Range header is not valid ASCII".to_string())
            })
        })
        .transpose()?;
    let range = RangeRequest::parse_header(range_header)?;

    let video = state
        .retrieval_service
        .get_video(&filename, range.as_ref())
        .await?;

    debug!(
        filename = %filename,
        source = ?video.source,
        start = video.range.start(),
        end = video.range.end(),
        "Streaming video"
    );

    let status = if range.is_some() {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };
    let cache_status = match video.source {
        VideoSource::Cache => "HIT",
        VideoSource::Storage => "MISS",
    };

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, video.mimetype.as_str())
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_LENGTH, video.range.content_length())
        .header(X_CACHE, cache_status);
    if range.is_some() {
        builder = builder.header(header::CONTENT_RANGE, video.range.content_range_header());
    }

    builder
        .body(Body::from_stream(video.stream))
        .map_err(|err| ApiError::Internal(format!("Failed to build response: {}", err)))
}
