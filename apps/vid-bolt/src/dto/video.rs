//! DTOs for video endpoints

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Multipart form accepted by the upload endpoint
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadRequest {
    /// Video file; the part's filename and content type describe the video
    #[schema(value_type = String, format = Binary)]
    pub video: Vec<u8>,
}

/// Response body for a successful upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    /// Success message
    #[schema(example = "Video uploaded successfully")]
    pub message: String,
}

impl UploadResponse {
    pub fn uploaded() -> Self {
        Self {
            message: "Video uploaded successfully".to_string(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error description
    #[schema(example = "Video clip.mp4 not found")]
    pub error: String,
}
