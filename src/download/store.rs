//! Image fetch-and-persist.
//!
//! [`ImageStore`] fetches image bytes through a [`BinarySource`] under a
//! [`RetryPolicy`] and writes them to the deterministic path produced by the
//! filename encoder: `{root}/category/{category_id}/{name}.png`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::filename::{image_path, relative_image_path};
use super::{DownloadError, HttpClient, RetryPolicy};
use crate::error::CrawlError;

/// Something that can return the raw bytes behind a URL.
#[async_trait]
pub trait BinarySource: Send + Sync {
    /// Fetches the full payload of `url`.
    async fn get_binary(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

#[async_trait]
impl BinarySource for HttpClient {
    async fn get_binary(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        self.get_bytes(url).await
    }
}

/// What an image is saved as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTarget {
    /// Title the file name is encoded from.
    pub title: String,
    /// Category directory the file goes into.
    pub category_id: u64,
    /// Optional id appended to the file name.
    pub image_id: Option<u64>,
}

impl ImageTarget {
    /// Path recorded in the catalog, relative to the store root.
    #[must_use]
    pub fn catalog_path(&self) -> String {
        relative_image_path(self.category_id, &self.title, self.image_id)
    }
}

/// Downloads images and writes them below an output root.
///
/// Cheap to clone; clones share the byte source and the saved-image counter.
#[derive(Clone)]
pub struct ImageStore {
    source: Arc<dyn BinarySource>,
    root: PathBuf,
    retry: RetryPolicy,
    saved: Arc<AtomicUsize>,
}

impl fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageStore")
            .field("root", &self.root)
            .field("retry", &self.retry)
            .field("saved", &self.saved_count())
            .finish_non_exhaustive()
    }
}

impl ImageStore {
    /// Creates a store writing below `root`.
    pub fn new(source: Arc<dyn BinarySource>, root: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        Self {
            source,
            root: root.into(),
            retry,
            saved: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Images written so far by this store and its clones.
    #[must_use]
    pub fn saved_count(&self) -> usize {
        self.saved.load(Ordering::Relaxed)
    }

    /// Output root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path an image would be written to.
    #[must_use]
    pub fn path_for(&self, target: &ImageTarget) -> PathBuf {
        image_path(
            &self.root,
            target.category_id,
            &target.title,
            target.image_id,
        )
    }

    /// Fetches `url` and saves it at the path derived from `target`.
    ///
    /// The parent directory is created when missing; an existing file at the
    /// path is overwritten.
    ///
    /// # Errors
    ///
    /// - [`CrawlError::Fetch`] when every attempt to fetch the bytes failed
    /// - [`CrawlError::Write`] when the directory or file could not be written
    #[instrument(skip(self, target), fields(category_id = target.category_id, image_id = ?target.image_id))]
    pub async fn fetch_and_save(
        &self,
        url: &str,
        target: &ImageTarget,
    ) -> Result<PathBuf, CrawlError> {
        let path = self.path_for(target);
        info!(path = %path.display(), "downloading image");

        let bytes = self
            .retry
            .run(|attempt| {
                debug!(attempt, "fetching image bytes");
                self.source.get_binary(url)
            })
            .await
            .map_err(|e| CrawlError::fetch(url, e))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CrawlError::write(parent, e))?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| CrawlError::write(&path, e))?;

        self.saved.fetch_add(1, Ordering::Relaxed);
        info!(path = %path.display(), bytes = bytes.len(), "saved image");
        Ok(path)
    }
}
