use image::DynamicImage;

use crate::data_url::{decode_data_url, is_data_url};
use crate::error::{QrError, Result};
use crate::options::LogoSource;

/// Fetches and decodes a logo image.
pub trait LogoLoader {
    fn load(&self, source: &LogoSource) -> Result<DynamicImage>;
}

/// Loads logos from local paths, `data:` URLs and raw bytes, and from
/// `http(s)://` URLs when the `remote` feature is enabled.
pub struct DefaultLogoLoader {
    #[cfg(feature = "remote")]
    client: reqwest::blocking::Client,
}

impl DefaultLogoLoader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            #[cfg(feature = "remote")]
            client: reqwest::blocking::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .map_err(|e| QrError::image_load("HTTP client", e))?,
        })
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        #[cfg(feature = "remote")]
        {
            let response = self
                .client
                .get(url)
                .send()
                .and_then(|r| r.error_for_status())
                .map_err(|e| QrError::image_load(url, e))?;
            let bytes = response.bytes().map_err(|e| QrError::image_load(url, e))?;
            Ok(bytes.to_vec())
        }

        #[cfg(not(feature = "remote"))]
        {
            Err(QrError::image_load(
                url,
                "fetching remote logos requires the `remote` feature",
            ))
        }
    }
}

impl LogoLoader for DefaultLogoLoader {
    fn load(&self, source: &LogoSource) -> Result<DynamicImage> {
        let location = source.to_string();
        let image = match source {
            LogoSource::Url(url) if is_data_url(url) => {
                let bytes =
                    decode_data_url(url).map_err(|e| QrError::image_load(&location, e))?;
                image::load_from_memory(&bytes)
            }
            LogoSource::Url(url) => {
                let bytes = self.fetch(url)?;
                image::load_from_memory(&bytes)
            }
            LogoSource::Path(path) => image::open(path),
            LogoSource::Bytes(bytes) => image::load_from_memory(bytes),
        }
        .map_err(|e| QrError::image_load(&location, e))?;

        tracing::debug!(
            source = %location,
            width = image.width(),
            height = image.height(),
            "loaded logo"
        );
        Ok(image)
    }
}
