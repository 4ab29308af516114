//! HTTP error mapping

use axum::{
    extract::multipart::MultipartError,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};
use vidlink_domain::VideoError;

use crate::dto::video::ErrorResponse;

/// Errors returned by handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Video(#[from] VideoError),

    /// The multipart body could not be read
    #[error("{0}")]
    Multipart(#[from] MultipartError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Video(err) => match err {
                VideoError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
                VideoError::NotFound(_) => StatusCode::NOT_FOUND,
                err if err.is_backend() => StatusCode::INTERNAL_SERVER_ERROR,
                // Validation and malformed Range headers
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Multipart(err) => err.status(),
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Multipart(err) => err.body_text(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %message, "Request rejected");
        }

        let mut response = (status, Json(ErrorResponse { error: message })).into_response();

        if let Self::Video(VideoError::RangeNotSatisfiable { total, .. }) = self {
            if let Ok(value) = HeaderValue::try_from(format!("bytes */{}", total)) {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
        }

        response
    }
}
