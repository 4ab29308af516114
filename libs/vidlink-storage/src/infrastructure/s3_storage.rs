//! S3 Storage Implementation
//!
//! This module implements the `VideoStorage` trait using AWS S3 as the backend.
//! It handles all S3 operations and converts AWS errors to domain errors.

use std::future::Future;

use aws_sdk_s3::{primitives::ByteStream as S3Body, Client};
use bytes::Bytes;
use futures::TryStreamExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info, instrument, warn};
use vidlink_domain::{
    ports::{ByteStream, VideoStorage},
    ByteRange, FileStats, Result, VideoError,
};

use crate::guess_mimetype;

/// S3-based implementation of the VideoStorage port
///
/// This adapter translates domain storage operations into AWS S3 API calls.
/// It follows the "Flat Storage" pattern - every video is stored at the root
/// of the bucket under its filename.
///
/// ## Configuration
///
/// The storage requires:
/// - An S3 bucket name
/// - An AWS SDK S3 Client (configured with region, credentials, endpoint)
///
/// ## Error Handling
///
/// Missing objects are reported as `None`. All other AWS SDK errors are
/// converted to `VideoError::StorageFailure` with descriptive messages.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3 storage
    ///
    /// # Arguments
    ///
    /// * `client` - Configured AWS S3 client
    /// * `bucket` - Name of the S3 bucket to use
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use aws_sdk_s3::Client;
    /// use vidlink_storage::S3Storage;
    ///
    /// # async fn example() {
    /// let config = aws_config::load_from_env().await;
    /// let s3_client = Client::new(&config);
    /// let storage = S3Storage::new(s3_client, "my-bucket".to_string());
    /// # }
    /// ```
    pub fn new(client: Client, bucket: String) -> Self {
        info!(bucket = %bucket, "Initializing S3Storage");
        Self { client, bucket }
    }

    /// Create an S3 storage from the standard AWS environment
    ///
    /// Path-style addressing is forced so MinIO and other S3-compatible
    /// servers work with the same configuration.
    pub async fn from_env(bucket: String) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
            .force_path_style(true)
            .build();

        Self::new(Client::from_conf(s3_config), bucket)
    }

    /// Get the bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// `Range` request header for a GetObject call
fn range_header(range: &ByteRange) -> String {
    format!("bytes={}-{}", range.start(), range.end())
}

/// Build stats from HeadObject output; the stored content type wins over the extension
fn stats_from_head(
    key: &str,
    content_length: Option<i64>,
    content_type: Option<&str>,
) -> Result<FileStats> {
    let size = content_length
        .and_then(|len| u64::try_from(len).ok())
        .ok_or_else(|| {
            VideoError::storage_failure(format!(
                "S3 head_object returned no valid content length for key '{}'",
                key
            ))
        })?;
    let mimetype = content_type
        .filter(|ct| !ct.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| guess_mimetype(key));

    Ok(FileStats {
        size,
        path: key.to_string(),
        mimetype,
    })
}

impl VideoStorage for S3Storage {
    #[instrument(skip(self, data), fields(bucket = %self.bucket, data_size = data.len()))]
    fn save(&self, filename: &str, data: &[u8]) -> impl Future<Output = Result<()>> + Send {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let key = filename.to_string();
        let content_type = guess_mimetype(filename);
        let data = Bytes::copy_from_slice(data);

        async move {
            debug!(key = %key, bucket = %bucket, "Saving video to S3");

            match client
                .put_object()
                .bucket(&bucket)
                .key(&key)
                .content_type(content_type)
                .body(S3Body::from(data))
                .send()
                .await
            {
                Ok(_) => {
                    info!(key = %key, "Successfully saved video to S3");
                    Ok(())
                }
                Err(err) => {
                    error!(key = %key, error = ?err, "Failed to save video to S3");
                    Err(VideoError::storage_failure(format!(
                        "S3 put_object failed for key '{}': {}",
                        key, err
                    )))
                }
            }
        }
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    fn get(&self, filename: &str) -> impl Future<Output = Result<Option<Bytes>>> + Send {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let key = filename.to_string();

        async move {
            debug!(key = %key, bucket = %bucket, "Retrieving video from S3");

            match client.get_object().bucket(&bucket).key(&key).send().await {
                Ok(output) => match output.body.collect().await {
                    Ok(data) => {
                        let bytes = data.into_bytes();
                        info!(key = %key, size = bytes.len(), "Successfully retrieved video from S3");
                        Ok(Some(bytes))
                    }
                    Err(err) => {
                        error!(key = %key, error = ?err, "Failed to read S3 object body");
                        Err(VideoError::storage_failure(format!(
                            "Failed to read S3 object body for key '{}': {}",
                            key, err
                        )))
                    }
                },
                Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                    debug!(key = %key, "Video does not exist in S3");
                    Ok(None)
                }
                Err(err) => {
                    warn!(key = %key, error = ?err, "Failed to retrieve video from S3");
                    Err(VideoError::storage_failure(format!(
                        "S3 get_object failed for key '{}': {}",
                        key, err
                    )))
                }
            }
        }
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    fn get_stats(&self, filename: &str) -> impl Future<Output = Result<Option<FileStats>>> + Send {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let key = filename.to_string();

        async move {
            debug!(key = %key, bucket = %bucket, "Fetching video stats from S3");

            match client.head_object().bucket(&bucket).key(&key).send().await {
                Ok(output) => {
                    stats_from_head(&key, output.content_length(), output.content_type()).map(Some)
                }
                Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => {
                    debug!(key = %key, "Video does not exist in S3");
                    Ok(None)
                }
                Err(err) => {
                    error!(key = %key, error = ?err, "Failed to fetch video stats from S3");
                    Err(VideoError::storage_failure(format!(
                        "S3 head_object failed for key '{}': {}",
                        key, err
                    )))
                }
            }
        }
    }

    #[instrument(skip(self, stats), fields(bucket = %self.bucket, key = %stats.path))]
    fn read_range(
        &self,
        stats: &FileStats,
        range: ByteRange,
    ) -> impl Future<Output = Result<ByteStream>> + Send {
        let client = self.client.clone();
        let bucket = self.bucket.clone();
        let key = stats.path.clone();

        async move {
            debug!(key = %key, range = %range_header(&range), "Opening ranged S3 read");

            let output = client
                .get_object()
                .bucket(&bucket)
                .key(&key)
                .range(range_header(&range))
                .send()
                .await
                .map_err(|err| {
                    error!(key = %key, error = ?err, "Failed to open ranged S3 read");
                    if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                        VideoError::not_found(key.clone())
                    } else {
                        VideoError::storage_failure(format!(
                            "S3 get_object failed for key '{}': {}",
                            key, err
                        ))
                    }
                })?;

            let stream = ReaderStream::new(output.body.into_async_read()).map_err(move |err| {
                error!(key = %key, error = ?err, "Failed to read S3 object body");
                VideoError::storage_failure(format!(
                    "Failed to read S3 object body for key '{}': {}",
                    key, err
                ))
            });

            Ok(Box::pin(stream) as ByteStream)
        }
    }
}
