//! Cover image loading with per-request cancellation.
//!
//! Loads are blocking and run off the UI thread. Each request carries an
//! [`ImageLoadHandle`]; the UI cancels the handle when the grid slot that asked
//! for the image is recycled, and discards any result whose handle was
//! cancelled in the meantime.

use std::{fs::read, path::PathBuf, sync::Arc};

use {tokio_util::sync::CancellationToken, tracing::debug};

use crate::error::ImageError;

/// File extensions probed for a cover, in order.
const COVER_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Encoded image bytes as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    /// Identifier the image was requested with.
    pub cover_id: String,
    /// Encoded image data (JPEG, PNG, ...).
    pub bytes: Arc<[u8]>,
}

/// Asynchronous-by-caller image fetch capability.
pub trait ImageManager: Send + Sync {
    /// Fetches the thumbnail for a cover identifier.
    ///
    /// Returns `Ok(None)` when no image exists for the identifier.
    ///
    /// # Errors
    ///
    /// Returns `ImageError::Cancelled` if the token was cancelled before the
    /// load completed, or `ImageError::Io` if the image could not be read.
    fn fetch_cover_thumbnail(
        &self,
        cover_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<CoverImage>, ImageError>;
}

/// Cancellation handle of one in-flight image load.
#[derive(Debug, Clone, Default)]
pub struct ImageLoadHandle {
    token: Arc<CancellationToken>,
}

impl ImageLoadHandle {
    /// Creates a fresh, uncancelled handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Token to pass to [`ImageManager::fetch_cover_thumbnail`].
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        CancellationToken::clone(&self.token)
    }

    /// Whether both handles belong to the same load.
    #[must_use]
    pub fn same_load(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.token, &other.token)
    }

    /// Cancels the load.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the load was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Image manager reading covers from a directory of `<cover id>.<ext>` files.
#[derive(Debug, Clone)]
pub struct FileImageManager {
    covers_dir: PathBuf,
}

impl FileImageManager {
    /// Creates an image manager over a covers directory.
    ///
    /// # Arguments
    ///
    /// * `covers_dir` - Directory holding `<cover id>.<ext>` files
    #[must_use]
    pub fn new(covers_dir: PathBuf) -> Self {
        Self { covers_dir }
    }

    fn find_cover(&self, cover_id: &str) -> Option<PathBuf> {
        COVER_EXTENSIONS
            .iter()
            .map(|ext| self.covers_dir.join(format!("{cover_id}.{ext}")))
            .find(|path| path.exists())
    }
}

impl ImageManager for FileImageManager {
    fn fetch_cover_thumbnail(
        &self,
        cover_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<CoverImage>, ImageError> {
        if cancel.is_cancelled() {
            return Err(ImageError::Cancelled);
        }

        // Identifiers come from the server; refuse anything that could leave the directory.
        if cover_id.is_empty() || cover_id.contains(['/', '\\']) || cover_id.starts_with('.') {
            return Ok(None);
        }

        let Some(path) = self.find_cover(cover_id) else {
            debug!(cover_id, "No cover on disk");
            return Ok(None);
        };

        let bytes = read(&path)?;
        if cancel.is_cancelled() {
            return Err(ImageError::Cancelled);
        }

        Ok(Some(CoverImage {
            cover_id: cover_id.to_string(),
            bytes: bytes.into(),
        }))
    }
}
