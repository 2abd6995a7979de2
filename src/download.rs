use std::fs;
use std::path::{Path, PathBuf};

use crate::data_url::decode_data_url;
use crate::error::DownloadError;

/// Hands a generated image to the user, e.g. through a browser "save as".
pub trait Downloader {
    fn download(&self, data_url: &str, filename: &str) -> Result<(), DownloadError>;
}

/// For environments with no way to save files.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unsupported;

impl Downloader for Unsupported {
    fn download(&self, _data_url: &str, _filename: &str) -> Result<(), DownloadError> {
        Err(DownloadError::Unsupported)
    }
}

/// Writes the decoded data URL payload into a directory.
#[derive(Debug, Clone)]
pub struct FileDownloader {
    dir: PathBuf,
}

impl FileDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn target_path(&self, filename: &str) -> PathBuf {
        // Only the final component is kept so a filename cannot escape `dir`.
        let name = Path::new(filename)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "qr-code.png".into());
        self.dir.join(name)
    }
}

impl Downloader for FileDownloader {
    fn download(&self, data_url: &str, filename: &str) -> Result<(), DownloadError> {
        let bytes = decode_data_url(data_url)?;
        fs::create_dir_all(&self.dir)?;
        let path = self.target_path(filename);
        fs::write(&path, bytes)?;
        tracing::debug!(path = %path.display(), "saved QR code");
        Ok(())
    }
}

/// Triggers the browser's download flow through a temporary `<a download>`.
#[cfg(feature = "wasm")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserDownloader;

#[cfg(feature = "wasm")]
impl Downloader for BrowserDownloader {
    fn download(&self, data_url: &str, filename: &str) -> Result<(), DownloadError> {
        use wasm_bindgen::JsCast;
        use web_sys::HtmlAnchorElement;

        let unavailable = |what: &str| DownloadError::Unavailable(what.to_string());

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| unavailable("no document"))?;
        let body = document.body().ok_or_else(|| unavailable("no document body"))?;

        let link = document
            .create_element("a")
            .map_err(|_| unavailable("cannot create anchor element"))?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(|_| unavailable("anchor element has unexpected type"))?;
        link.set_href(data_url);
        link.set_download(filename);

        body.append_child(&link)
            .map_err(|_| unavailable("cannot attach anchor element"))?;
        link.click();
        body.remove_child(&link)
            .map_err(|_| unavailable("cannot detach anchor element"))?;
        Ok(())
    }
}
