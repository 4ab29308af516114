//! Local Filesystem Storage Implementation
//!
//! This module implements the `VideoStorage` trait on a single upload
//! directory. Every video is one flat file named after the video.

use std::future::Future;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use futures::TryStreamExt;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info, instrument};
use vidlink_domain::{
    ports::{ByteStream, VideoStorage},
    ByteRange, FileStats, Result, VideoError,
};

use crate::guess_mimetype;

/// Read buffer size for range streams
const READ_CHUNK_SIZE: usize = 64 * 1024;

static STAGING_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Filesystem-based implementation of the VideoStorage port
///
/// `FileStats::path` is the file's path inside the upload directory, relative
/// or absolute depending on how the directory was configured.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    upload_dir: PathBuf,
}

impl LocalStorage {
    /// Create a storage rooted at `upload_dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns `VideoError::StorageFailure` if the directory cannot be created
    pub async fn new(upload_dir: impl Into<PathBuf>) -> Result<Self> {
        let upload_dir = upload_dir.into();

        if !fs::try_exists(&upload_dir).await.unwrap_or(false) {
            info!(path = %upload_dir.display(), "Upload directory does not exist, creating it");
        }
        fs::create_dir_all(&upload_dir).await.map_err(|err| {
            VideoError::storage_failure(format!(
                "Failed to create upload directory {}: {}",
                upload_dir.display(),
                err
            ))
        })?;

        info!(path = %upload_dir.display(), "Initialized LocalStorage");
        Ok(Self { upload_dir })
    }

    /// Get the upload directory
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Unique sibling path a video is written to before being renamed into place
    fn staging_path(&self, filename: &str) -> PathBuf {
        let n = STAGING_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.upload_dir
            .join(format!(".{}.{}-{}.part", filename, std::process::id(), n))
    }

    /// Map a filename to its path, refusing names that would leave the upload directory
    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let is_flat = !filename.is_empty()
            && !filename.contains(['/', '\\', '\0'])
            && !filename.contains("..");

        is_flat.then(|| self.upload_dir.join(filename))
    }
}

/// Create `path`, write `data` and flush it to disk
async fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let mut file = fs::File::create(path).await.map_err(|err| {
        error!(path = %path.display(), error = ?err, "Failed to create file");
        VideoError::storage_failure(format!("Failed to create file {}: {}", path.display(), err))
    })?;
    file.write_all(data).await.map_err(|err| {
        VideoError::storage_failure(format!("Failed to write file {}: {}", path.display(), err))
    })?;
    file.sync_all().await.map_err(|err| {
        VideoError::storage_failure(format!("Failed to sync file {}: {}", path.display(), err))
    })
}

impl VideoStorage for LocalStorage {
    #[instrument(skip(self, data), fields(data_size = data.len()))]
    fn save(&self, filename: &str, data: &[u8]) -> impl Future<Output = Result<()>> + Send {
        let paths = self
            .resolve(filename)
            .map(|path| {
                let staging = self.staging_path(filename);
                (path, staging)
            })
            .ok_or_else(|| {
                VideoError::storage_failure(format!(
                    "Refusing to store invalid filename '{}'",
                    filename
                ))
            });
        let data = Bytes::copy_from_slice(data);

        async move {
            let (path, staging) = paths?;
            debug!(path = %path.display(), staging = %staging.display(), "Saving video to disk");

            let written = match write_file(&staging, &data).await {
                Ok(()) => fs::rename(&staging, &path).await.map_err(|err| {
                    error!(path = %path.display(), error = ?err, "Failed to move video into place");
                    VideoError::storage_failure(format!(
                        "Failed to rename {} to {}: {}",
                        staging.display(),
                        path.display(),
                        err
                    ))
                }),
                Err(err) => Err(err),
            };
            if let Err(err) = written {
                // Best effort cleanup
                let _ = fs::remove_file(&staging).await;
                return Err(err);
            }

            info!(path = %path.display(), size_bytes = data.len(), "Saved video to disk");
            Ok(())
        }
    }

    #[instrument(skip(self))]
    fn get(&self, filename: &str) -> impl Future<Output = Result<Option<Bytes>>> + Send {
        let path = self.resolve(filename);

        async move {
            let Some(path) = path else {
                return Ok(None);
            };

            match fs::read(&path).await {
                Ok(data) => Ok(Some(Bytes::from(data))),
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "File not found");
                    Ok(None)
                }
                Err(err) => {
                    error!(path = %path.display(), error = ?err, "Failed to read file");
                    Err(VideoError::storage_failure(format!(
                        "Failed to read file {}: {}",
                        path.display(),
                        err
                    )))
                }
            }
        }
    }

    #[instrument(skip(self))]
    fn get_stats(&self, filename: &str) -> impl Future<Output = Result<Option<FileStats>>> + Send {
        let path = self.resolve(filename);
        let mimetype = guess_mimetype(filename);

        async move {
            let Some(path) = path else {
                return Ok(None);
            };

            match fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => Ok(Some(FileStats {
                    size: meta.len(),
                    path: path.to_string_lossy().into_owned(),
                    mimetype,
                })),
                Ok(_) => Ok(None),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => {
                    error!(path = %path.display(), error = ?err, "Failed to stat file");
                    Err(VideoError::storage_failure(format!(
                        "Failed to stat file {}: {}",
                        path.display(),
                        err
                    )))
                }
            }
        }
    }

    #[instrument(skip(self, stats), fields(path = %stats.path, start = range.start(), end = range.end()))]
    fn read_range(
        &self,
        stats: &FileStats,
        range: ByteRange,
    ) -> impl Future<Output = Result<ByteStream>> + Send {
        let path = PathBuf::from(&stats.path);

        async move {
            let mut file = fs::File::open(&path).await.map_err(|err| {
                error!(path = %path.display(), error = ?err, "Failed to open file");
                match err.kind() {
                    ErrorKind::NotFound => VideoError::not_found(path.display().to_string()),
                    _ => VideoError::storage_failure(format!(
                        "Failed to open file {}: {}",
                        path.display(),
                        err
                    )),
                }
            })?;
            file.seek(SeekFrom::Start(range.start()))
                .await
                .map_err(|err| {
                    VideoError::storage_failure(format!(
                        "Failed to seek file {}: {}",
                        path.display(),
                        err
                    ))
                })?;

            let reader = file.take(range.content_length());
            let display_path = path.display().to_string();
            let stream = ReaderStream::with_capacity(reader, READ_CHUNK_SIZE).map_err(move |err| {
                error!(path = %display_path, error = ?err, "Failed to read chunk");
                VideoError::storage_failure(format!("Failed to read {}: {}", display_path, err))
            });

            Ok(Box::pin(stream) as ByteStream)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn collect(stream: ByteStream) -> Vec<u8> {
        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
        chunks.concat()
    }

    #[tokio::test]
    async fn test_new_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("uploads");

        let storage = LocalStorage::new(&nested).await.unwrap();

        assert!(nested.is_dir());
        assert_eq!(storage.upload_dir(), nested.as_path());
    }

    #[tokio::test]
    async fn test_save_get_and_stats() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        storage.save("clip.mp4", b"0123456789").await.unwrap();

        let data = storage.get("clip.mp4").await.unwrap().unwrap();
        assert_eq!(&data[..], b"0123456789");

        let stats = storage.get_stats("clip.mp4").await.unwrap().unwrap();
        assert_eq!(stats.size, 10);
        assert_eq!(stats.mimetype, "video/mp4");
        assert!(stats.path.ends_with("clip.mp4"));
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_object() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        storage.save("clip.mp4", b"first version").await.unwrap();
        storage.save("clip.mp4", b"v2").await.unwrap();

        let stats = storage.get_stats("clip.mp4").await.unwrap().unwrap();
        assert_eq!(stats.size, 2);
    }

    #[tokio::test]
    async fn test_overwrite_does_not_disturb_open_reader() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        storage.save("clip.mp4", b"0123456789abcdefghi").await.unwrap();
        let stats = storage.get_stats("clip.mp4").await.unwrap().unwrap();
        let reader = storage
            .read_range(&stats, ByteRange::new(0, 18, 19).unwrap())
            .await
            .unwrap();

        storage.save("clip.mp4", b"v2").await.unwrap();

        assert_eq!(collect(reader).await, b"0123456789abcdefghi");
        assert_eq!(&storage.get("clip.mp4").await.unwrap().unwrap()[..], b"v2");
    }

    #[tokio::test]
    async fn test_save_leaves_no_staging_files() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        storage.save("clip.mp4", b"first").await.unwrap();
        storage.save("clip.mp4", b"second").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["clip.mp4".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_file_is_absent() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();

        assert!(storage.get("missing.mp4").await.unwrap().is_none());
        assert!(storage.get_stats("missing.mp4").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_traversal_names_are_refused() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("uploads")).await.unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();

        assert!(storage.get("../secret.txt").await.unwrap().is_none());
        assert!(storage.get_stats("../secret.txt").await.unwrap().is_none());
        assert!(matches!(
            storage.save("../escape.mp4", b"x").await,
            Err(VideoError::StorageFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_directories_are_not_videos() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        std::fs::create_dir(dir.path().join("folder.mp4")).unwrap();

        assert!(storage.get_stats("folder.mp4").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_range_is_bounded_and_inclusive() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        storage.save("clip.mp4", b"0123456789abcdefghi").await.unwrap();
        let stats = storage.get_stats("clip.mp4").await.unwrap().unwrap();

        let middle = storage
            .read_range(&stats, ByteRange::new(5, 9, 19).unwrap())
            .await
            .unwrap();
        assert_eq!(collect(middle).await, b"56789");

        let tail = storage
            .read_range(&stats, ByteRange::new(18, 18, 19).unwrap())
            .await
            .unwrap();
        assert_eq!(collect(tail).await, b"i");
    }

    #[tokio::test]
    async fn test_read_range_of_large_file_streams_in_chunks() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        let data: Vec<u8> = (0..300_000u32).map(|i| (i % 253) as u8).collect();
        storage.save("big.mp4", &data).await.unwrap();
        let stats = storage.get_stats("big.mp4").await.unwrap().unwrap();

        let range = ByteRange::new(10, 299_999, 300_000).unwrap();
        let chunks: Vec<Bytes> = storage
            .read_range(&stats, range)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), &data[10..]);
    }

    #[tokio::test]
    async fn test_read_range_of_deleted_file_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        storage.save("clip.mp4", b"0123").await.unwrap();
        let stats = storage.get_stats("clip.mp4").await.unwrap().unwrap();
        std::fs::remove_file(&stats.path).unwrap();

        let result = storage
            .read_range(&stats, ByteRange::new(0, 3, 4).unwrap())
            .await;
        assert!(matches!(result, Err(VideoError::NotFound(_))));
    }
}
