//! Ingestion service - Business logic orchestration
//!
//! This module contains the core business logic for video uploads.
//! The service validates a video, writes it to the cache port, then persists
//! its bytes through the storage port.

use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::error::{Result, ValidationError};
use crate::ports::{VideoCache, VideoStorage};
use crate::video::{cache_key, Video};

/// Configuration for the ingestion service
#[derive(Debug, Clone)]
pub struct IngestionConfig {
    /// Maximum allowed declared size in bytes (default: 10MiB)
    pub max_file_size_bytes: u64,
    /// Cache time to live (default: 1 hour); zero disables expiry
    pub cache_ttl: Duration,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 10 * 1024 * 1024, // 10MiB
            cache_ttl: Duration::from_secs(3600),
        }
    }
}

/// Service for ingesting videos
///
/// This service encapsulates the business rules for uploads:
/// - Validates metadata, mimetype, size and filename
/// - Writes the full video (bytes included) to the cache first
/// - Persists the bytes to durable storage second
///
/// If the storage write fails after the cache write, the cache entry stays
/// until it expires or fails the retrieval integrity check.
///
/// ## Static Dispatch
///
/// The service is generic over any `VideoCache` and `VideoStorage`
/// implementation. The compiler will generate specialized versions for each
/// concrete pair.
pub struct IngestionService<C, S> {
    cache: C,
    storage: S,
    config: IngestionConfig,
}

impl<C, S> IngestionService<C, S>
where
    C: VideoCache,
    S: VideoStorage,
{
    /// Create a new IngestionService with the given ports and configuration
    pub fn new(cache: C, storage: S, config: IngestionConfig) -> Self {
        Self {
            cache,
            storage,
            config,
        }
    }

    /// Create a new IngestionService with default configuration
    pub fn with_ports(cache: C, storage: S) -> Self {
        Self::new(cache, storage, IngestionConfig::default())
    }

    /// Validate and store a video using the configured cache TTL
    ///
    /// # Errors
    ///
    /// - `VideoError::Validation` if the video is missing or rejected
    /// - `VideoError::CacheFailure` if the cache write fails
    /// - `VideoError::StorageFailure` if the storage write fails
    pub async fn process_video(&self, video: Option<Video>) -> Result<()> {
        self.process_video_with_ttl(video, self.config.cache_ttl)
            .await
    }

    /// Validate and store a video with an explicit cache TTL
    ///
    /// A video without content is a metadata-only submission: it is cached
    /// but nothing is written to storage.
    #[instrument(skip(self, video), fields(filename = tracing::field::Empty, ttl_secs = ttl.as_secs()))]
    pub async fn process_video_with_ttl(&self, video: Option<Video>, ttl: Duration) -> Result<()> {
        let video = video.ok_or(ValidationError::MissingMetadata)?;
        tracing::Span::current().record("filename", video.filename());

        self.validate(&video)?;

        let ttl = (!ttl.is_zero()).then_some(ttl);
        self.cache
            .set(&cache_key(video.filename()), &video, ttl)
            .await?;
        debug!(size = video.size(), "Cached video");

        match video.content() {
            Some(content) => {
                self.storage.save(video.filename(), content).await?;
                info!(size = content.len(), "Stored video");
            }
            None => debug!("Video has no content, skipping storage write"),
        }

        Ok(())
    }

    /// Get the service configuration
    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    fn validate(&self, video: &Video) -> std::result::Result<(), ValidationError> {
        // Business rule: only video/* mimetypes are accepted
        if !is_video_mimetype(video.mimetype()) {
            return Err(ValidationError::NotAVideo {
                mimetype: video.mimetype().to_string(),
            });
        }

        // Business rule: enforce maximum declared size
        if video.size() > self.config.max_file_size_bytes {
            return Err(ValidationError::TooLarge {
                size: video.size(),
                max: self.config.max_file_size_bytes,
            });
        }

        // Business rule: the filename doubles as a flat storage key
        if !is_valid_filename(video.filename()) {
            return Err(ValidationError::InvalidFilename(
                video.filename().to_string(),
            ));
        }

        Ok(())
    }
}

fn is_video_mimetype(mimetype: &str) -> bool {
    mimetype
        .split_once('/')
        .is_some_and(|(primary, _)| primary.trim().eq_ignore_ascii_case("video"))
}

fn is_valid_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains(['/', '\\', '\0'])
        && !filename.contains("..")
}
