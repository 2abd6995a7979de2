use crate::compose::{compose, ComposeTarget};
use crate::data_url::encode_png_data_url;
use crate::error::{QrError, Result};
use crate::logo::{DefaultLogoLoader, LogoLoader};
use crate::options::{RenderOptions, RenderTarget};
use crate::qr::{QrRasterizer, QrcodeRasterizer};
use crate::url_check::is_valid_url;

/// Generates QR code images for URLs, optionally with a logo in the middle.
///
/// The rasterizer and the logo loader are injectable so callers can swap in
/// their own encoder or image source.
pub struct QrCodeGenerator<R = QrcodeRasterizer, L = DefaultLogoLoader> {
    rasterizer: R,
    loader: L,
}

impl QrCodeGenerator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            rasterizer: QrcodeRasterizer,
            loader: DefaultLogoLoader::new()?,
        })
    }
}

impl<R: QrRasterizer, L: LogoLoader> QrCodeGenerator<R, L> {
    pub fn with_parts(rasterizer: R, loader: L) -> Self {
        Self { rasterizer, loader }
    }

    /// Returns the QR code for `url` as a `data:image/png;base64,` URL.
    pub fn generate_qr_code(&self, url: &str, options: &RenderOptions) -> Result<String> {
        let image = self.generate_image(url, options)?;
        encode_png_data_url(&image)
    }

    /// Same as [`Self::generate_qr_code`] but returns the raw raster.
    pub fn generate_image(&self, url: &str, options: &RenderOptions) -> Result<image::RgbaImage> {
        if !is_valid_url(url) {
            return Err(QrError::InvalidInput(format!("invalid URL: {:?}", url)));
        }

        let params = options.raster_params()?;
        let target = options.target()?;

        let qr = self.rasterizer.rasterize(url, &params)?;

        let image = match &target {
            RenderTarget::Plain => compose(&qr, options.size, ComposeTarget::Plain),
            RenderTarget::WithLogo { source, style } => {
                let logo = self.loader.load(source)?.into_rgba8();
                compose(&qr, options.size, ComposeTarget::WithLogo(&logo, style))
            }
        };

        tracing::debug!(
            url,
            size = options.size,
            logo = matches!(target, RenderTarget::WithLogo { .. }),
            "generated QR code"
        );
        Ok(image)
    }
}
