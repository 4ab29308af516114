//! Byte range model for partial content delivery
//!
//! A `ByteRange` is always derived from a client `RangeRequest` (possibly
//! absent) clamped against an authoritative total size through [`normalize`].
//! Both retrieval paths go through the same function so they agree on range
//! semantics.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VideoError};

/// A client-supplied range before validation
///
/// Either bound may be absent. `None` in place of a whole `RangeRequest`
/// means the full object was requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRequest {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

impl RangeRequest {
    pub fn new(start: Option<u64>, end: Option<u64>) -> Self {
        Self { start, end }
    }

    /// Request everything from `start` to the end of the object
    pub fn from_start(start: u64) -> Self {
        Self::new(Some(start), None)
    }

    /// Request everything from the beginning of the object up to `end`
    pub fn up_to(end: u64) -> Self {
        Self::new(None, Some(end))
    }
}

/// A validated, inclusive `[start, end]` byte range within an object of `total` bytes
///
/// Invariants (checked at construction): `start <= end < total`, hence `total > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ByteRange {
    start: u64,
    end: u64,
    total: u64,
}

impl ByteRange {
    /// Build a range, failing with `RangeNotSatisfiable` if it does not fit
    ///
    /// # Example
    ///
    /// ```rust
    /// use vidlink_domain::ByteRange;
    ///
    /// let range = ByteRange::new(0, 9, 19).unwrap();
    /// assert_eq!(range.content_length(), 10);
    /// assert_eq!(range.content_range_header(), "bytes 0-9/19");
    ///
    /// assert!(ByteRange::new(5, 19, 19).is_err());
    /// ```
    pub fn new(start: u64, end: u64, total: u64) -> Result<Self> {
        if total == 0 || start > end || end >= total {
            return Err(VideoError::range_not_satisfiable(start, end, total));
        }

        Ok(Self { start, end, total })
    }

    /// First byte offset, inclusive
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last byte offset, inclusive
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Size of the whole object
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of bytes covered by the range
    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value of the `Content-Range` response header
    pub fn content_range_header(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }

    /// Whether the range covers the whole object
    pub fn is_whole(&self) -> bool {
        self.start == 0 && self.end + 1 == self.total
    }
}

/// Clamp an optional client request against the authoritative total size
///
/// A missing start defaults to `0` and a missing end to `total - 1`. Requests
/// that do not fit (e.g. `end >= total`, `start > end`, or an empty object)
/// fail with `RangeNotSatisfiable`.
pub fn normalize(request: Option<&RangeRequest>, total: u64) -> Result<ByteRange> {
    let start = request.and_then(|r| r.start).unwrap_or(0);
    let end = match request.and_then(|r| r.end) {
        Some(end) => end,
        None => match total.checked_sub(1) {
            Some(last) => last,
            None => return Err(VideoError::range_not_satisfiable(start, 0, total)),
        },
    };

    ByteRange::new(start, end, total)
}
