//! In-process video cache with TTL-based invalidation

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;
use vidlink_domain::{ports::VideoCache, Result, Video};

#[derive(Clone, Debug)]
struct CachedEntry {
    video: Video,
    expires_at: Option<Instant>,
}

impl CachedEntry {
    fn is_live(&self) -> bool {
        self.expires_at.map_or(true, |deadline| Instant::now() < deadline)
    }
}

/// Thread-safe video cache keyed by cache key
///
/// Expired entries are dropped lazily when they are next read. Clones share
/// the same underlying map.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, CachedEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held, expired or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, key: &str) -> Option<Video> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live() {
                debug!(key, "Video cache HIT");
                return Some(entry.video.clone());
            }
        }
        self.evict_expired(key);
        debug!(key, "Video cache MISS");
        None
    }

    /// Remove `key` only if its current entry has expired
    fn evict_expired(&self, key: &str) {
        self.entries.remove_if(key, |_, entry| !entry.is_live());
    }
}

impl VideoCache for MemoryCache {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Video>>> + Send {
        let video = self.lookup(key);
        async move { Ok(video) }
    }

    fn set(
        &self,
        key: &str,
        video: &Video,
        ttl: Option<Duration>,
    ) -> impl Future<Output = Result<()>> + Send {
        self.entries.insert(
            key.to_string(),
            CachedEntry {
                video: video.clone(),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        debug!(key, ttl_secs = ttl.map(|t| t.as_secs()), "Video cached");
        async { Ok(()) }
    }

    fn exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send {
        let exists = self.lookup(key).is_some();
        async move { Ok(exists) }
    }
}
