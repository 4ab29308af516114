//! Domain entities for videos
//!
//! A `Video` is the record created at upload time. It is cached as a whole
//! (including its bytes) and may be reconstructed from a text-based cache
//! transport, which is why its content serializes as base64.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Namespace prefix for cached videos
const CACHE_KEY_PREFIX: &str = "video:";

/// Derive the cache key for a video filename
///
/// The prefix keeps video entries apart from unrelated keys in a shared cache.
pub fn cache_key(filename: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, filename)
}

/// An uploaded video
///
/// Videos are immutable once constructed. The entity stores whatever it is
/// given: `size` is the declared size and is NOT checked against `content`
/// here. Retrieval performs that integrity check before serving cached bytes.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use vidlink_domain::Video;
///
/// let video = Video::new("clip.mp4", "video/mp4", Bytes::from_static(b"0123456789"));
/// assert_eq!(video.size(), 10);
/// assert_eq!(video.filename(), "clip.mp4");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// Unique key of the video
    filename: String,

    /// Declared size in bytes
    size: u64,

    /// Declared mimetype, e.g. `video/mp4`
    mimetype: String,

    /// Raw bytes, absent for metadata-only submissions
    #[serde(default, with = "base64_content")]
    content: Option<Bytes>,

    /// Timestamp when the video was uploaded
    uploaded_at: DateTime<Utc>,
}

impl Video {
    /// Create a video from uploaded bytes; the size is taken from the content
    pub fn new(filename: impl Into<String>, mimetype: impl Into<String>, content: Bytes) -> Self {
        Self {
            filename: filename.into(),
            size: content.len() as u64,
            mimetype: mimetype.into(),
            content: Some(content),
            uploaded_at: Utc::now(),
        }
    }

    /// Create a video that carries no bytes
    pub fn metadata_only(
        filename: impl Into<String>,
        size: u64,
        mimetype: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            size,
            mimetype: mimetype.into(),
            content: None,
            uploaded_at: Utc::now(),
        }
    }

    /// Create a Video with explicit values (used for reconstruction)
    pub fn from_parts(
        filename: String,
        size: u64,
        mimetype: String,
        content: Option<Bytes>,
        uploaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            filename,
            size,
            mimetype,
            content,
            uploaded_at,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Get the declared size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }

    /// Get the raw bytes, if any were supplied
    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }

    /// Get the upload timestamp
    pub fn uploaded_at(&self) -> &DateTime<Utc> {
        &self.uploaded_at
    }
}

/// Authoritative descriptor of an object held by durable storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    /// Size of the stored object in bytes
    pub size: u64,

    /// Backend-specific locator used to open range reads
    pub path: String,

    pub mimetype: String,
}

/// Serde helpers storing `Option<Bytes>` as an optional base64 string
mod base64_content {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use bytes::Bytes;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(content: &Option<Bytes>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match content {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Bytes>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|text| {
                STANDARD
                    .decode(text)
                    .map(Bytes::from)
                    .map_err(de::Error::custom)
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_namespaced() {
        assert_eq!(cache_key("clip.mp4"), "video:clip.mp4");
    }

    #[test]
    fn test_video_creation() {
        let video = Video::new("clip.mp4", "video/mp4", Bytes::from_static(&[1, 2, 3]));

        assert_eq!(video.size(), 3);
        assert_eq!(video.mimetype(), "video/mp4");
        assert_eq!(video.content().map(|c| c.len()), Some(3));
    }

    #[test]
    fn test_metadata_only_video_has_no_content() {
        let video = Video::metadata_only("clip.mp4", 1000, "video/mp4");

        assert_eq!(video.size(), 1000);
        assert!(video.content().is_none());
    }

    #[test]
    fn test_video_from_parts_keeps_mismatched_size() {
        let now = Utc::now();
        let video = Video::from_parts(
            "clip.mp4".to_string(),
            1000,
            "video/mp4".to_string(),
            Some(Bytes::from_static(b"1234567")),
            now,
        );

        assert_eq!(video.size(), 1000);
        assert_eq!(video.content().map(|c| c.len()), Some(7));
        assert_eq!(video.uploaded_at(), &now);
    }

    #[test]
    fn test_content_survives_text_transport() {
        let original = Video::new("clip.mp4", "video/mp4", Bytes::from_static(&[0, 159, 255, 10]));

        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains("\"content\":\"AJ//Cg==\""));

        let restored: Video = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_invalid_base64_content_is_rejected() {
        let json = r#"{"filename":"clip.mp4","size":3,"mimetype":"video/mp4","content":"not base64!","uploadedAt":"2024-01-01T00:00:00Z"}"#;

        assert!(serde_json::from_str::<Video>(json).is_err());
    }

    #[test]
    fn test_missing_content_deserializes_as_metadata_only() {
        let json = r#"{"filename":"clip.mp4","size":3,"mimetype":"video/mp4","uploadedAt":"2024-01-01T00:00:00Z"}"#;

        let video: Video = serde_json::from_str(json).unwrap();
        assert!(video.content().is_none());
    }
}
