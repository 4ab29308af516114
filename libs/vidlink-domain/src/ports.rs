//! Ports (trait definitions) for external dependencies
//!
//! This module defines the contracts (ports) that external adapters must implement.
//! Following hexagonal architecture, the domain defines what it needs, and the
//! infrastructure provides implementations.
//!
//! ## Static Dispatch
//!
//! We use native Rust async traits with `impl Future` return types instead of
//! `async_trait` to ensure zero-cost abstractions and static dispatch.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures::Stream;

use crate::error::{Result, VideoError};
use crate::video::{ByteRange, FileStats, Video};

/// A lazy, finite, single-pass sequence of byte chunks
///
/// Streams must be drained or dropped by the consumer to release the
/// underlying file handle or buffer.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::result::Result<Bytes, VideoError>> + Send>>;

/// Port for the key/value cache holding whole videos
///
/// Implementations decide the wire format. Text-based formats must encode the
/// video's bytes (the `Video` serde impl already does so with base64).
pub trait VideoCache: Send + Sync {
    /// Look up a video by cache key
    ///
    /// # Returns
    ///
    /// `None` on a miss or when the entry has expired
    ///
    /// # Errors
    ///
    /// Returns `VideoError::CacheFailure` if the backend or decoding fails
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Video>>> + Send;

    /// Store a video under a cache key
    ///
    /// # Arguments
    ///
    /// * `key` - The cache key (see [`cache_key`](crate::video::cache_key))
    /// * `video` - The video, including its bytes
    /// * `ttl` - Time to live; `None` keeps the entry until the backend evicts it
    ///
    /// # Errors
    ///
    /// Returns `VideoError::CacheFailure` if the write fails
    fn set(
        &self,
        key: &str,
        video: &Video,
        ttl: Option<Duration>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Check whether a live entry exists for a cache key
    fn exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send;
}

/// Port for durable video storage
///
/// This trait abstracts away the storage backend (filesystem, S3, etc.).
/// Implementations must convert infrastructure errors to
/// `VideoError::StorageFailure` and report missing objects as `None`, never
/// as an error.
pub trait VideoStorage: Send + Sync {
    /// Persist raw bytes under a filename, replacing any previous object
    fn save(&self, filename: &str, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Read a whole object
    fn get(&self, filename: &str) -> impl Future<Output = Result<Option<Bytes>>> + Send;

    /// Describe a stored object: size, locator and mimetype
    fn get_stats(&self, filename: &str) -> impl Future<Output = Result<Option<FileStats>>> + Send;

    /// Open a bounded read of `range` (inclusive) against the object at `stats.path`
    ///
    /// The returned stream yields at most `range.content_length()` bytes.
    fn read_range(
        &self,
        stats: &FileStats,
        range: ByteRange,
    ) -> impl Future<Output = Result<ByteStream>> + Send;
}
