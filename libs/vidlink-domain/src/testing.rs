//! In-memory port fakes shared by the service tests

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures::stream;

use crate::error::{Result, VideoError};
use crate::ports::{ByteStream, VideoCache, VideoStorage};
use crate::video::{ByteRange, FileStats, Video};

#[derive(Clone, Default)]
pub struct InMemoryCache {
    entries: Arc<Mutex<HashMap<String, (Video, Option<Duration>)>>>,
    writes: Arc<AtomicUsize>,
    failing: bool,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose every operation fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Seed an entry without going through `set`
    pub fn insert(&self, key: &str, video: Video) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (video, None));
    }

    pub fn entry(&self, key: &str) -> Option<(Video, Option<Duration>)> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            return Err(VideoError::cache_failure("connection refused"));
        }
        Ok(())
    }
}

impl VideoCache for InMemoryCache {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Video>>> + Send {
        let result = self.check().map(|_| self.entry(key).map(|(video, _)| video));
        async move { result }
    }

    fn set(
        &self,
        key: &str,
        video: &Video,
        ttl: Option<Duration>,
    ) -> impl Future<Output = Result<()>> + Send {
        let result = self.check().map(|_| {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (video.clone(), ttl));
        });
        async move { result }
    }

    fn exists(&self, key: &str) -> impl Future<Output = Result<bool>> + Send {
        let result = self.check().map(|_| self.entry(key).is_some());
        async move { result }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    objects: Arc<Mutex<HashMap<String, Bytes>>>,
    writes: Arc<AtomicUsize>,
    stat_calls: Arc<AtomicUsize>,
    failing: bool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A storage whose every operation fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Seed an object without going through `save`
    pub fn insert(&self, filename: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(filename.to_string(), Bytes::copy_from_slice(data));
    }

    pub fn object(&self, filename: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(filename).cloned()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn stat_calls(&self) -> usize {
        self.stat_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.failing {
            return Err(VideoError::storage_failure("disk unavailable"));
        }
        Ok(())
    }
}

fn mimetype_for(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext) {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}

impl VideoStorage for InMemoryStorage {
    fn save(&self, filename: &str, data: &[u8]) -> impl Future<Output = Result<()>> + Send {
        let result = self.check().map(|_| {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.insert(filename, data);
        });
        async move { result }
    }

    fn get(&self, filename: &str) -> impl Future<Output = Result<Option<Bytes>>> + Send {
        let result = self.check().map(|_| self.object(filename));
        async move { result }
    }

    fn get_stats(&self, filename: &str) -> impl Future<Output = Result<Option<FileStats>>> + Send {
        self.stat_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.check().map(|_| {
            self.object(filename).map(|data| FileStats {
                size: data.len() as u64,
                path: filename.to_string(),
                mimetype: mimetype_for(filename).to_string(),
            })
        });
        async move { result }
    }

    fn read_range(
        &self,
        stats: &FileStats,
        range: ByteRange,
    ) -> impl Future<Output = Result<ByteStream>> + Send {
        let result = self.check().and_then(|_| {
            let data = self
                .object(&stats.path)
                .ok_or_else(|| VideoError::not_found(stats.path.clone()))?;
            let chunk = data.slice(range.start() as usize..=range.end() as usize);
            Ok(Box::pin(stream::once(async move { Ok(chunk) })) as ByteStream)
        });
        async move { result }
    }
}
