//! Domain errors for video operations
//!
//! This module defines all possible errors that can occur while ingesting or
//! serving videos. These are domain-level errors that abstract away
//! infrastructure details.

use thiserror::Error;

/// Reasons an uploaded video is rejected before anything is written
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No video was supplied with the upload
    #[error("No video metadata provided")]
    MissingMetadata,

    /// The declared mimetype's primary type is not `video`
    #[error("File must be a video (got '{mimetype}')")]
    NotAVideo { mimetype: String },

    /// The declared size exceeds the configured ceiling
    #[error("File size ({size} bytes) must not exceed {max} bytes")]
    TooLarge { size: u64, max: u64 },

    /// The filename cannot be used as a storage key
    #[error("Invalid filename: '{0}'")]
    InvalidFilename(String),
}

/// Errors that can occur during video ingestion and retrieval
///
/// `CacheFailure` and `StorageFailure` together form the backend error class:
/// I/O faults that are not recovered locally.
#[derive(Error, Debug)]
pub enum VideoError {
    /// The upload failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The Range header does not match `bytes=<start>-<end>`
    #[error("Invalid Range format: {0}")]
    InvalidRangeFormat(String),

    /// The Range header matched but a value could not be parsed
    #[error("Invalid Range values: {0}")]
    InvalidRangeValue(String),

    /// The requested range does not fit inside the object
    #[error("Range {start}-{end} is not satisfiable for an object of {total} bytes")]
    RangeNotSatisfiable { start: u64, end: u64, total: u64 },

    /// The video exists in neither cache nor storage
    #[error("Video {0} not found")]
    NotFound(String),

    /// The cache backend failed
    #[error("Cache operation failed: {0}")]
    CacheFailure(String),

    /// The storage backend failed
    #[error("Storage operation failed: {0}")]
    StorageFailure(String),
}

impl VideoError {
    /// Create a cache failure error with a message
    pub fn cache_failure(msg: impl Into<String>) -> Self {
        Self::CacheFailure(msg.into())
    }

    /// Create a storage failure error with a message
    pub fn storage_failure(msg: impl Into<String>) -> Self {
        Self::StorageFailure(msg.into())
    }

    /// Create a not found error for a filename
    pub fn not_found(filename: impl Into<String>) -> Self {
        Self::NotFound(filename.into())
    }

    /// Create an unsatisfiable range error
    pub fn range_not_satisfiable(start: u64, end: u64, total: u64) -> Self {
        Self::RangeNotSatisfiable { start, end, total }
    }

    /// Whether this error comes from a cache or storage backend fault
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::CacheFailure(_) | Self::StorageFailure(_))
    }
}

/// Result type alias for video operations
pub type Result<T> = std::result::Result<T, VideoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_failure_error() {
        let err = VideoError::storage_failure("disk unplugged");
        assert!(matches!(err, VideoError::StorageFailure(_)));
        assert_eq!(err.to_string(), "Storage operation failed: disk unplugged");
        assert!(err.is_backend());
    }

    #[test]
    fn test_validation_error_is_transparent() {
        let err: VideoError = ValidationError::TooLarge {
            size: 2048,
            max: 1024,
        }
        .into();
        assert!(err.to_string().contains("2048"));
        assert!(err.to_string().contains("1024"));
        assert!(!err.is_backend());
    }

    #[test]
    fn test_range_not_satisfiable_error() {
        let err = VideoError::range_not_satisfiable(10, 5, 19);
        assert_eq!(
            err.to_string(),
            "Range 10-5 is not satisfiable for an object of 19 bytes"
        );
    }

    #[test]
    fn test_not_found_error() {
        let err = VideoError::not_found("missing.mp4");
        assert_eq!(err.to_string(), "Video missing.mp4 not found");
    }
}
