//! Storage backend implementations

mod local_storage;
mod s3_storage;

pub use local_storage::LocalStorage;
pub use s3_storage::S3Storage;
