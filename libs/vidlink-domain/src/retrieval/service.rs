//! Retrieval service - range-aware video delivery
//!
//! Lookup order:
//! 1. The cache, under the namespaced key. A cached video is only served if
//!    its stored byte length equals its declared size.
//! 2. Durable storage, whose stats are authoritative for size and mimetype.
//!
//! A storage hit never populates the cache; that is ingestion's job.

use std::fmt;

use bytes::Bytes;
use futures::stream;
use tracing::{debug, instrument, warn};

use crate::error::{Result, VideoError};
use crate::ports::{ByteStream, VideoCache, VideoStorage};
use crate::video::{cache_key, normalize, ByteRange, RangeRequest, Video};

/// Chunk size used when streaming a cached buffer
const CACHE_CHUNK_SIZE: usize = 64 * 1024;

/// Where the bytes of a [`VideoStream`] come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSource {
    Cache,
    Storage,
}

/// A video ready to be written to an HTTP response
pub struct VideoStream {
    /// Bytes of `range`, in order; single-pass
    pub stream: ByteStream,
    pub range: ByteRange,
    pub mimetype: String,
    pub source: VideoSource,
}

impl fmt::Debug for VideoStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoStream")
            .field("range", &self.range)
            .field("mimetype", &self.mimetype)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Service for serving videos with byte-range support
///
/// The service is generic over any `VideoCache` and `VideoStorage`
/// implementation, like [`IngestionService`](crate::IngestionService).
pub struct RetrievalService<C, S> {
    cache: C,
    storage: S,
}

impl<C, S> RetrievalService<C, S>
where
    C: VideoCache,
    S: VideoStorage,
{
    /// Create a new RetrievalService with the given ports
    pub fn new(cache: C, storage: S) -> Self {
        Self { cache, storage }
    }

    /// Resolve a video and open a stream over the requested range
    ///
    /// # Arguments
    ///
    /// * `filename` - The video's unique filename
    /// * `range` - The parsed client range; `None` means the whole video
    ///
    /// # Errors
    ///
    /// - `VideoError::NotFound` if neither cache nor storage has the video
    /// - `VideoError::RangeNotSatisfiable` if the range does not fit the video
    /// - `VideoError::StorageFailure` if storage fails; cache faults are
    ///   logged and fall through to storage instead
    #[instrument(skip(self, range), fields(range = ?range))]
    pub async fn get_video(
        &self,
        filename: &str,
        range: Option<&RangeRequest>,
    ) -> Result<VideoStream> {
        match self.cache.get(&cache_key(filename)).await {
            Ok(Some(video)) => match verified_content(&video) {
                Some(content) => {
                    debug!("Serving video from cache");
                    return stream_from_cache(&video, content, range);
                }
                None => warn!(
                    declared_size = video.size(),
                    cached_size = video.content().map(Bytes::len),
                    "Cached video failed integrity check, falling back to storage"
                ),
            },
            Ok(None) => debug!("Video not in cache"),
            Err(err) => warn!(error = %err, "Cache lookup failed, falling back to storage"),
        }

        self.stream_from_storage(filename, range).await
    }

    /// Check whether a video currently has a cache entry
    pub async fn is_cached(&self, filename: &str) -> Result<bool> {
        self.cache.exists(&cache_key(filename)).await
    }

    async fn stream_from_storage(
        &self,
        filename: &str,
        range: Option<&RangeRequest>,
    ) -> Result<VideoStream> {
        let stats = self
            .storage
            .get_stats(filename)
            .await?
            .ok_or_else(|| VideoError::not_found(filename))?;

        let range = normalize(range, stats.size)?;
        let stream = self.storage.read_range(&stats, range).await?;
        debug!(size = stats.size, "Serving video from storage");

        Ok(VideoStream {
            stream,
            range,
            mimetype: stats.mimetype,
            source: VideoSource::Storage,
        })
    }
}

/// Integrity check: cached bytes are only trusted if their length matches the declared size
fn verified_content(video: &Video) -> Option<&Bytes> {
    video
        .content()
        .filter(|content| content.len() as u64 == video.size())
}

fn stream_from_cache(
    video: &Video,
    content: &Bytes,
    range: Option<&RangeRequest>,
) -> Result<VideoStream> {
    let range = normalize(range, video.size())?;

    Ok(VideoStream {
        stream: chunked(content.clone(), range),
        range,
        mimetype: video.mimetype().to_string(),
        source: VideoSource::Cache,
    })
}

/// Lazily yield `[range.start, range.end]` of a buffer as zero-copy chunks
fn chunked(content: Bytes, range: ByteRange) -> ByteStream {
    let start = range.start() as usize;
    let end = range.end() as usize + 1;

    let chunks = (start..end).step_by(CACHE_CHUNK_SIZE).map(move |offset| {
        let chunk_end = end.min(offset + CACHE_CHUNK_SIZE);
        Ok(content.slice(offset..chunk_end))
    });

    Box::pin(stream::iter(chunks))
}
