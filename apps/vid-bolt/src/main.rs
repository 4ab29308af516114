//! VidBolt - Video Upload and Streaming Service
//!
//! HTTP service for uploading videos into VidLink and streaming them back
//! with byte-range support. Reads go through the cache first and fall back
//! to durable storage.

mod backend;
mod config;
mod dto;
mod error;
mod handlers;
mod routes;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vidlink_domain::{IngestionConfig, IngestionService, RetrievalService};

use crate::backend::{CacheBackend, StorageBackend};
use crate::config::{Config, LogFormat};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub ingestion_service: Arc<IngestionService<CacheBackend, StorageBackend>>,
    pub retrieval_service: Arc<RetrievalService<CacheBackend, StorageBackend>>,
}

impl AppState {
    /// Wire both services to the same adapters
    pub fn new(cache: CacheBackend, storage: StorageBackend, config: IngestionConfig) -> Self {
        Self {
            ingestion_service: Arc::new(IngestionService::new(
                cache.clone(),
                storage.clone(),
                config,
            )),
            retrieval_service: Arc::new(RetrievalService::new(cache, storage)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    init_tracing(config.log_format);

    info!("Starting VidBolt video service");
    config.log_summary();

    let cache = CacheBackend::connect(&config).await?;
    let storage = StorageBackend::connect(&config).await?;

    // Create shared application state
    let state = AppState::new(cache, storage, config.ingestion());

    // Build HTTP router
    let app = routes::create_router(state);

    let addr = config.addr();
    info!(addr = %addr, "Starting HTTP server");

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("VidBolt stopped");
    Ok(())
}

/// Install the global subscriber; `RUST_LOG` overrides the default `info` level
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
