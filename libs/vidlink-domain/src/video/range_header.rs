//! Parser for the HTTP `Range` request header
//!
//! Only single ranges of the form `bytes=<start>-<end>` are supported. Bounds
//! are not checked against the object size here; that happens in
//! [`normalize`](super::normalize) once the authoritative total is known.

use crate::error::{Result, VideoError};

use super::RangeRequest;

const UNIT_PREFIX: &str = "bytes=";

impl RangeRequest {
    /// Parse a `Range` header value
    ///
    /// An absent or empty header means the whole file and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// - `VideoError::InvalidRangeFormat` if the value is not `bytes=<digits?>-<digits?>`,
    ///   or if both bounds are empty
    /// - `VideoError::InvalidRangeValue` if a bound does not fit in a `u64`
    ///
    /// # Example
    ///
    /// ```rust
    /// use vidlink_domain::RangeRequest;
    ///
    /// let range = RangeRequest::parse_header(Some("bytes=5-")).unwrap();
    /// assert_eq!(range, Some(RangeRequest::from_start(5)));
    ///
    /// assert!(RangeRequest::parse_header(Some("bytes=a-b")).is_err());
    /// ```
    pub fn parse_header(header: Option<&str>) -> Result<Option<Self>> {
        let value = match header {
            Some(value) if !value.is_empty() => value,
            _ => return Ok(None),
        };

        let (start, end) = value
            .strip_prefix(UNIT_PREFIX)
            .and_then(|ranges| ranges.split_once('-'))
            .filter(|(start, end)| is_digits(start) && is_digits(end))
            .ok_or_else(|| VideoError::InvalidRangeFormat(value.to_string()))?;

        if start.is_empty() && end.is_empty() {
            return Err(VideoError::InvalidRangeFormat(value.to_string()));
        }

        Ok(Some(Self::new(parse_bound(start)?, parse_bound(end)?)))
    }
}

fn is_digits(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_digit())
}

fn parse_bound(text: &str) -> Result<Option<u64>> {
    if text.is_empty() {
        return Ok(None);
    }

    text.parse::<u64>()
        .map(Some)
        .map_err(|_| VideoError::InvalidRangeValue(text.to_string()))
}
