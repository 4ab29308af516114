//! Retrieval domain module
//!
//! This module decides whether a video is served from the cache or from
//! durable storage, and produces a bounded byte stream plus the range metadata
//! needed for a partial content response.

mod service;

pub use service::{RetrievalService, VideoSource, VideoStream};
