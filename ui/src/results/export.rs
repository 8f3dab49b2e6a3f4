//! Platform save targets for chart downloads.

use crate::core::download::{DownloadError, SaveTarget};

#[cfg(target_arch = "wasm32")]
pub type PlatformSave = BrowserSave;

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformSave = DirectorySave;

#[cfg(target_arch = "wasm32")]
pub fn platform_target() -> Result<PlatformSave, DownloadError> {
    Ok(BrowserSave)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn platform_target() -> Result<PlatformSave, DownloadError> {
    DirectorySave::user_exports()
}

/// Browser downloads: blob object URL plus a hidden anchor click.
#[cfg(target_arch = "wasm32")]
pub struct BrowserSave;

#[cfg(target_arch = "wasm32")]
impl SaveTarget for BrowserSave {
    type Handle = String;

    fn acquire(&self, bytes: Vec<u8>, mime: &str) -> Result<String, DownloadError> {
        use web_sys::{Blob, BlobPropertyBag, Url};

        let array = js_sys::Uint8Array::from(bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&array.buffer());

        let opts = BlobPropertyBag::new();
        opts.set_type(mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
            .map_err(|_| DownloadError::Prepare("failed to create blob".into()))?;
        Url::create_object_url_with_blob(&blob)
            .map_err(|_| DownloadError::Prepare("unable to create object URL".into()))
    }

    fn save(&self, handle: &String, filename: &str) -> Result<Option<String>, DownloadError> {
        use wasm_bindgen::JsCast;
        use web_sys::HtmlAnchorElement;

        let failed = |reason: &str| DownloadError::Save {
            filename: filename.to_string(),
            reason: reason.to_string(),
        };

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| failed("document unavailable"))?;
        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|_| failed("unable to create anchor"))?
            .dyn_into()
            .map_err(|_| failed("anchor cast failed"))?;
        anchor.set_href(handle);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        document
            .body()
            .ok_or_else(|| failed("missing body"))?
            .append_child(&anchor)
            .map_err(|_| failed("unable to attach anchor"))?;
        anchor.click();
        anchor.remove();
        Ok(None)
    }

    fn release(&self, handle: &String) {
        web_sys::Url::revoke_object_url(handle).ok();
    }
}

/// Desktop downloads: bytes go to a hidden `.part` file in `dir`, which is
/// renamed into place on save.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DirectorySave {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirectorySave {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/exports` for the current user.
    pub fn user_exports() -> Result<Self, DownloadError> {
        let dirs = directories::ProjectDirs::from("com", "Marketlens", "Marketlens").ok_or_else(
            || DownloadError::Prepare("unable to determine export directory".into()),
        )?;
        Ok(Self::new(dirs.data_dir().join("exports")))
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SaveTarget for DirectorySave {
    type Handle = std::path::PathBuf;

    fn acquire(&self, bytes: Vec<u8>, _mime: &str) -> Result<Self::Handle, DownloadError> {
        use std::fs;

        let prepare = |err: std::io::Error| DownloadError::Prepare(err.to_string());
        fs::create_dir_all(&self.dir).map_err(prepare)?;
        let part = self.dir.join(format!(".{}.part", uuid::Uuid::new_v4()));
        fs::write(&part, &bytes).map_err(prepare)?;
        Ok(part)
    }

    fn save(&self, handle: &Self::Handle, filename: &str) -> Result<Option<String>, DownloadError> {
        let name = std::path::Path::new(filename)
            .file_name()
            .ok_or_else(|| DownloadError::Save {
                filename: filename.to_string(),
                reason: "not a file name".into(),
            })?;
        let path = self.dir.join(name);
        std::fs::rename(handle, &path).map_err(|err| DownloadError::Save {
            filename: filename.to_string(),
            reason: err.to_string(),
        })?;
        Ok(Some(path.to_string_lossy().to_string()))
    }

    fn release(&self, handle: &Self::Handle) {
        if handle.exists() {
            if let Err(err) = std::fs::remove_file(handle) {
                tracing::warn!(path = %handle.display(), error = %err, "leftover partial download");
            }
        }
    }
}
