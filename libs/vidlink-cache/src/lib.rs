//! Cache adapters for VidLink
//!
//! Two implementations of the [`VideoCache`](vidlink_domain::ports::VideoCache) port:
//!
//! - [`MemoryCache`]: in-process, TTL-aware, suitable for single-node deployments and tests
//! - [`RedisCache`]: shared Redis instance, videos stored as JSON with base64 content

mod memory;
mod redis_cache;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;
