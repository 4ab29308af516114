//! Redis Video Cache Implementation
//!
//! This module implements the `VideoCache` trait on top of Redis. Videos are
//! stored as JSON documents; their bytes travel as base64 inside the document.
//! All Redis and decoding errors are converted to `VideoError::CacheFailure`.

use std::future::Future;
use std::time::Duration;

use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tracing::{debug, error, info, instrument, warn};
use vidlink_domain::{ports::VideoCache, Result, Video, VideoError};

/// Redis-based implementation of the VideoCache port
///
/// The connection manager reconnects transparently after network failures,
/// so a single instance can be cloned and shared across handlers.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    /// Connect to the Redis server at `host:port`
    ///
    /// # Errors
    ///
    /// Returns `VideoError::CacheFailure` if the URL is invalid or the initial
    /// connection cannot be established
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let url = format!("redis://{}:{}/", host, port);
        info!(url = %url, "Connecting to Redis");

        let client = Client::open(url.as_str()).map_err(|err| {
            VideoError::cache_failure(format!("Invalid Redis URL '{}': {}", url, err))
        })?;
        let connection = ConnectionManager::new(client).await.map_err(|err| {
            VideoError::cache_failure(format!("Failed to connect to Redis at '{}': {}", url, err))
        })?;

        Ok(Self { connection })
    }
}

/// Serialize a video for storage as a Redis string
fn encode(video: &Video) -> Result<String> {
    serde_json::to_string(video)
        .map_err(|err| VideoError::cache_failure(format!("Failed to encode video: {}", err)))
}

/// Restore a video from its Redis string, bytes included
fn decode(key: &str, payload: &str) -> Result<Video> {
    serde_json::from_str(payload).map_err(|err| {
        VideoError::cache_failure(format!("Corrupt cache entry for key '{}': {}", key, err))
    })
}

/// Expiry for `PSETEX`; sub-millisecond TTLs round up so that any non-zero TTL expires
fn expiry_millis(ttl: Option<Duration>) -> Option<u64> {
    ttl.filter(|ttl| !ttl.is_zero())
        .map(|ttl| u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1))
}

impl VideoCache for RedisCache {
    #[instrument(skip(self))]
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Video>>> + Send {
        let mut connection = self.connection.clone();
        let key = key.to_string();

        async move {
            let payload: Option<String> = connection.get(&key).await.map_err(|err| {
                warn!(key = %key, error = ?err, "Failed to read from Redis");
                VideoError::cache_failure(format!("Redis GET failed for key '{}': {}", key, err))
            })?;

            match payload {
                Some(payload) => {
                    debug!(key = %key, bytes = payload.len(), "Redis cache HIT");
                    decode(&key, &payload).map(Some)
                }
                None => {
                    debug!(key = %key, "Redis cache MISS");
                    Ok(None)
                }
            }
        }
    }

    #[instrument(skip(self, video), fields(size = video.size()))]
    fn set(
        &self,
        key: &str,
        video: &Video,
        ttl: Option<Duration>,
    ) -> impl Future<Output = Result<()>> + Send {
        let mut connection = self.connection.clone();
        let key = key.to_string();
        let payload = encode(video);

        async move {
            let payload = payload?;
            let outcome = match expiry_millis(ttl) {
                Some(millis) => connection.pset_ex::<_, _, ()>(&key, payload, millis).await,
                None => connection.set::<_, _, ()>(&key, payload).await,
            };

            match outcome {
                Ok(()) => {
                    debug!(key = %key, "Stored video in Redis");
                    Ok(())
                }
                Err(err) => {
                    error!(key = %key, error = ?err, "Failed to write to Redis");
                    Err(VideoError::cache_failure(format!(
                        "Redis SET failed for key '{}': {}",
                        key, err
                    )))
                }
            }
        }
    }

    #[instrument(skip(self))]
    fn exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send {
        let mut connection = self.connection.clone();
        let key = key.to_string();

        async move {
            connection.exists(&key).await.map_err(|err| {
                error!(key = %key, error = ?err, "Failed to check key in Redis");
                VideoError::cache_failure(format!("Redis EXISTS failed for key '{}': {}", key, err))
            })
        }
    }
}
