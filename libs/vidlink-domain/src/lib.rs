//! # VidLink Domain Layer
//!
//! This crate contains the pure business logic and domain models for VidLink,
//! a video upload and range-aware delivery service. It follows hexagonal
//! architecture principles:
//!
//! - **Entities**: Core domain models (Video, FileStats, ByteRange)
//! - **Ports**: Trait definitions for external dependencies (VideoCache, VideoStorage)
//! - **Services**: Business logic orchestration (ingestion and retrieval)
//!
//! ## Architecture
//!
//! This layer has NO dependencies on infrastructure concerns (Redis, S3, HTTP, etc.).
//! All external dependencies are expressed as traits (ports) that will be implemented
//! by adapter layers.
//!
//! ## Example
//!
//! ```rust
//! use vidlink_domain::ports::{VideoCache, VideoStorage};
//! use vidlink_domain::{RangeRequest, RetrievalService};
//!
//! // The service is generic over any cache and storage implementation
//! async fn example<C: VideoCache, S: VideoStorage>(service: RetrievalService<C, S>) {
//!     let range = RangeRequest::parse_header(Some("bytes=0-9")).unwrap();
//!     let video = service.get_video("clip.mp4", range.as_ref()).await.unwrap();
//!     println!("Serving {}", video.range.content_range_header());
//! }
//! ```

pub mod error;
pub mod ingestion;
pub mod ports;
pub mod retrieval;
pub mod video;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use error::{Result, ValidationError, VideoError};
pub use ingestion::{IngestionConfig, IngestionService};
pub use ports::{ByteStream, VideoCache, VideoStorage};
pub use retrieval::{RetrievalService, VideoSource, VideoStream};
pub use video::{cache_key, normalize, ByteRange, FileStats, RangeRequest, Video};
