//! Service configuration
//!
//! Read once at startup from the process environment and handed to the
//! constructors that need it. Unparseable values fail startup.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::info;
use vidlink_domain::IngestionConfig;

/// Which cache adapter backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Memory,
    Redis,
}

impl FromStr for CacheKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            other => bail!("unknown cache backend '{}' (expected memory or redis)", other),
        }
    }
}

/// Which storage adapter backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Local,
    S3,
}

impl FromStr for StorageKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "s3" => Ok(Self::S3),
            other => bail!("unknown storage backend '{}' (expected local or s3)", other),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => bail!("unknown log format '{}' (expected text or json)", other),
        }
    }
}

/// Runtime configuration for VidBolt
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub cache_backend: CacheKind,
    pub cache_host: String,
    pub cache_port: u16,
    pub storage_backend: StorageKind,
    pub upload_directory: PathBuf,
    pub s3_bucket: String,
    pub max_file_size_bytes: u64,
    pub cache_ttl_seconds: u64,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            host: string("BOLT_HOST", "0.0.0.0"),
            port: parse(&lookup, "BOLT_PORT", 3000)?,
            cache_backend: parse(&lookup, "VIDLINK_CACHE_BACKEND", CacheKind::Redis)?,
            cache_host: string("REDIS_HOST", "localhost"),
            cache_port: parse(&lookup, "REDIS_PORT", 6379)?,
            storage_backend: parse(&lookup, "VIDLINK_STORAGE_BACKEND", StorageKind::Local)?,
            upload_directory: PathBuf::from(string("UPLOAD_DIR", "./uploads")),
            s3_bucket: string("VIDLINK_BUCKET", "vidlink"),
            max_file_size_bytes: parse(&lookup, "VIDLINK_MAX_FILE_SIZE", 10 * 1024 * 1024)?,
            cache_ttl_seconds: parse(&lookup, "VIDLINK_CACHE_TTL_SECS", 3600)?,
            log_format: parse(&lookup, "LOG_FORMAT", LogFormat::Text)?,
        })
    }

    /// Socket address to bind
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Ingestion limits derived from this configuration
    pub fn ingestion(&self) -> IngestionConfig {
        IngestionConfig {
            max_file_size_bytes: self.max_file_size_bytes,
            cache_ttl: Duration::from_secs(self.cache_ttl_seconds),
        }
    }

    /// Log the effective configuration
    pub fn log_summary(&self) {
        info!(
            addr = %self.addr(),
            cache_backend = ?self.cache_backend,
            storage_backend = ?self.storage_backend,
            max_file_size_bytes = self.max_file_size_bytes,
            cache_ttl_seconds = self.cache_ttl_seconds,
            "Loaded configuration"
        );
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err: T::Err| anyhow::anyhow!("{}", err))
            .with_context(|| format!("invalid value '{}' for {}", raw, key)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.cache_backend, CacheKind::Redis);
        assert_eq!(config.cache_host, "localhost");
        assert_eq!(config.cache_port, 6379);
        assert_eq!(config.storage_backend, StorageKind::Local);
        assert_eq!(config.upload_directory, PathBuf::from("./uploads"));
        assert_eq!(config.s3_bucket, "vidlink");
        assert_eq!(config.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.cache_ttl_seconds, 3600);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("BOLT_PORT", "8080"),
            ("VIDLINK_CACHE_BACKEND", "memory"),
            ("VIDLINK_STORAGE_BACKEND", "S3"),
            ("VIDLINK_MAX_FILE_SIZE", "2048"),
            ("VIDLINK_CACHE_TTL_SECS", "0"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.cache_backend, CacheKind::Memory);
        assert_eq!(config.storage_backend, StorageKind::S3);
        assert_eq!(config.log_format, LogFormat::Json);

        let ingestion = config.ingestion();
        assert_eq!(ingestion.max_file_size_bytes, 2048);
        assert!(ingestion.cache_ttl.is_zero());
    }

    #[test]
    fn test_unparseable_values_are_errors() {
        let err = config(&[("REDIS_PORT", "not-a-port")]).unwrap_err();
        assert!(err.to_string().contains("REDIS_PORT"));

        assert!(config(&[("VIDLINK_CACHE_BACKEND", "memcached")]).is_err());
        assert!(config(&[("VIDLINK_MAX_FILE_SIZE", "-1")]).is_err());
    }
}
