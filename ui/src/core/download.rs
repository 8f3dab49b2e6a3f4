//! Fetch-and-save for chart images, independent of how they are displayed.

use api::{AnalysisBackend, CancelToken, ClientError};
use thiserror::Error;
use tracing::{info, warn};

/// Save name used when the caller offers none.
pub const FALLBACK_FILENAME: &str = "analysis_result.png";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    /// The binary fetch failed; carries the user-facing message.
    #[error("{0}")]
    Fetch(String),
    /// The local transient object could not be created.
    #[error("could not prepare download: {0}")]
    Prepare(String),
    #[error("could not save `{filename}`: {reason}")]
    Save { filename: String, reason: String },
    #[error("download cancelled")]
    Cancelled,
}

impl From<ClientError> for DownloadError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Cancelled => Self::Cancelled,
            other => Self::Fetch(other.user_message()),
        }
    }
}

/// Where downloaded bytes end up.
///
/// `acquire` turns the bytes into a transient local object (an object URL in
/// the browser, a partial file on desktop). `save` starts the save-as action.
/// `release` is called exactly once for every acquired handle.
pub trait SaveTarget {
    type Handle;

    fn acquire(&self, bytes: Vec<u8>, mime: &str) -> Result<Self::Handle, DownloadError>;

    /// Returns the saved location when the platform knows it.
    fn save(&self, handle: &Self::Handle, filename: &str) -> Result<Option<String>, DownloadError>;

    fn release(&self, handle: &Self::Handle);
}

/// Releases its handle when dropped, whichever way the download exits.
struct Transient<'t, T: SaveTarget> {
    target: &'t T,
    handle: T::Handle,
}

impl<'t, T: SaveTarget> Transient<'t, T> {
    fn acquire(target: &'t T, bytes: Vec<u8>, mime: &str) -> Result<Self, DownloadError> {
        let handle = target.acquire(bytes, mime)?;
        Ok(Self { target, handle })
    }

    fn save(&self, filename: &str) -> Result<Option<String>, DownloadError> {
        self.target.save(&self.handle, filename)
    }
}

impl<T: SaveTarget> Drop for Transient<'_, T> {
    fn drop(&mut self) {
        self.target.release(&self.handle);
    }
}

pub struct DownloadManager<'a, T: SaveTarget> {
    backend: &'a dyn AnalysisBackend,
    target: &'a T,
}

impl<'a, T: SaveTarget> DownloadManager<'a, T> {
    pub fn new(backend: &'a dyn AnalysisBackend, target: &'a T) -> Self {
        Self { backend, target }
    }

    /// Fetches `resource_url` (relative paths resolve against the backend
    /// origin) and saves it as `suggested_filename`.
    pub async fn download(
        &self,
        resource_url: &str,
        suggested_filename: &str,
        cancel: &CancelToken,
    ) -> Result<Option<String>, DownloadError> {
        let url = self.backend.resolve(resource_url);
        let filename = save_name(suggested_filename);

        let bytes = self
            .backend
            .fetch_resource(&url, cancel)
            .await
            .inspect_err(|err| warn!(%url, error = %err, "download fetch failed"))?;

        let transient = Transient::acquire(self.target, bytes, mime_for(filename))?;
        let saved = transient
            .save(filename)
            .inspect_err(|err| warn!(%filename, error = %err, "saving download failed"))?;
        info!(%url, %filename, location = ?saved, "download saved");
        Ok(saved)
    }
}

fn save_name(suggested: &str) -> &str {
    let trimmed = suggested.trim();
    if trimmed.is_empty() {
        FALLBACK_FILENAME
    } else {
        trimmed
    }
}

fn mime_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
