//! Runtime selection of cache and storage adapters
//!
//! The domain services are generic over their ports. The binary picks the
//! concrete adapters from configuration, so each port gets an enum that
//! dispatches to the selected adapter.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use bytes::Bytes;
use tracing::info;
use vidlink_cache::{MemoryCache, RedisCache};
use vidlink_domain::{
    ports::{ByteStream, VideoCache, VideoStorage},
    ByteRange, FileStats, Video,
};
use vidlink_storage::{LocalStorage, S3Storage};

use crate::config::{CacheKind, Config, StorageKind};

/// Cache adapter chosen at startup
#[derive(Clone)]
pub enum CacheBackend {
    Memory(MemoryCache),
    Redis(RedisCache),
}

impl CacheBackend {
    /// Build the configured cache adapter
    pub async fn connect(config: &Config) -> Result<Self> {
        match config.cache_backend {
            CacheKind::Memory => {
                info!("Using in-memory video cache");
                Ok(Self::Memory(MemoryCache::new()))
            }
            CacheKind::Redis => {
                let cache = RedisCache::connect(&config.cache_host, config.cache_port)
                    .await
                    .context("failed to initialize Redis cache")?;
                Ok(Self::Redis(cache))
            }
        }
    }
}

impl VideoCache for CacheBackend {
    fn get(&self, key: &str) -> impl Future<Output = vidlink_domain::Result<Option<Video>>> + Send {
        async move {
            match self {
                Self::Memory(cache) => cache.get(key).await,
                Self::Redis(cache) => cache.get(key).await,
            }
        }
    }

    fn set(
        &self,
        key: &str,
        video: &Video,
        ttl: Option<Duration>,
    ) -> impl Future<Output = vidlink_domain::Result<()>> + Send {
        async move {
            match self {
                Self::Memory(cache) => cache.set(key, video, ttl).await,
                Self::Redis(cache) => cache.set(key, video, ttl).await,
            }
        }
    }

    fn exists(&self, key: &str) -> impl Future<Output = vidlink_domain::Result<bool>> + Send {
        async move {
            match self {
                Self::Memory(cache) => cache.exists(key).await,
                Self::Redis(cache) => cache.exists(key).await,
            }
        }
    }
}

/// Storage adapter chosen at startup
#[derive(Clone)]
pub enum StorageBackend {
    Local(LocalStorage),
    S3(S3Storage),
}

impl StorageBackend {
    /// Build the configured storage adapter
    pub async fn connect(config: &Config) -> Result<Self> {
        match config.storage_backend {
            StorageKind::Local => {
                let storage = LocalStorage::new(&config.upload_directory)
                    .await
                    .context("failed to initialize local storage")?;
                Ok(Self::Local(storage))
            }
            StorageKind::S3 => {
                info!(bucket = %config.s3_bucket, "Using S3 video storage");
                Ok(Self::S3(S3Storage::from_env(config.s3_bucket.clone()).await))
            }
        }
    }
}

impl VideoStorage for StorageBackend {
    fn save(
        &self,
        filename: &str,
        data: &[u8],
    ) -> impl Future<Output = vidlink_domain::Result<()>> + Send {
        async move {
            match self {
                Self::Local(storage) => storage.save(filename, data).await,
                Self::S3(storage) => storage.save(filename, data).await,
            }
        }
    }

    fn get(
        &self,
        filename: &str,
    ) -> impl Future<Output = vidlink_domain::Result<Option<Bytes>>> + Send {
        async move {
            match self {
                Self::Local(storage) => storage.get(filename).await,
                Self::S3(storage) => storage.get(filename).await,
            }
        }
    }

    fn get_stats(
        &self,
        filename: &str,
    ) -> impl Future<Output = vidlink_domain::Result<Option<FileStats>>> + Send {
        async move {
            match self {
                Self::Local(storage) => storage.get_stats(filename).await,
                Self::S3(storage) => storage.get_stats(filename).await,
            }
        }
    }

    fn read_range(
        &self,
        stats: &FileStats,
        range: ByteRange,
    ) -> impl Future<Output = vidlink_domain::Result<ByteStream>> + Send {
        async move {
            match self {
                Self::Local(storage) => storage.read_range(stats, range).await,
                Self::S3(storage) => storage.read_range(stats, range).await,
            }
        }
    }
}
