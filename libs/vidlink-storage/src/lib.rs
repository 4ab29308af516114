//! Durable storage adapters for VidLink
//!
//! Implementations of the [`VideoStorage`](vidlink_domain::ports::VideoStorage) port:
//!
//! - [`LocalStorage`]: files in an upload directory (default deployment)
//! - [`S3Storage`]: objects in an S3 (or MinIO) bucket

pub mod infrastructure;

pub use infrastructure::{LocalStorage, S3Storage};

/// Mimetype for a filename based on its extension
pub(crate) fn guess_mimetype(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
