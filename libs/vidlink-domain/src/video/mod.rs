//! Video domain module
//!
//! This module contains the video entity, the storage descriptor returned by
//! durable backends, and the byte range model used for partial content.

mod entity;
mod range;
mod range_header;

pub use entity::{cache_key, FileStats, Video};
pub use range::{normalize, ByteRange, RangeRequest};
