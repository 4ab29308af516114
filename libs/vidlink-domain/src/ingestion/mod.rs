//! Ingestion domain module
//!
//! This module contains the business rules for accepting an uploaded video:
//! validation, then a cache write, then a durable storage write.

mod service;

pub use service::{IngestionConfig, IngestionService};
