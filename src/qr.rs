use image::RgbaImage;
use qrcode::{Color, QrCode};

use crate::error::{QrError, Result};
use crate::options::RasterParams;

/// Module size used when the requested width cannot fit one pixel per module.
pub const FALLBACK_MODULE_PIXELS: u32 = 4;
/// Side of the largest (version 40) symbol, in modules.
pub const MAX_MODULES: u32 = 177;
/// Largest raster side, in pixels, that will be allocated.
pub const MAX_RASTER_SIDE: u32 = 8192;

/// Turns text into a QR code raster.
pub trait QrRasterizer {
    fn rasterize(&self, text: &str, params: &RasterParams) -> Result<RgbaImage>;
}

/// The default rasterizer, built on the `qrcode` crate.
///
/// The output is exactly `params.width` pixels square whenever the width can
/// hold at least one pixel per module (quiet zone included); modules are then
/// scaled fractionally. Otherwise every module is four pixels wide.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrcodeRasterizer;

impl QrRasterizer for QrcodeRasterizer {
    fn rasterize(&self, text: &str, params: &RasterParams) -> Result<RgbaImage> {
        let code = encode(text, params)?;
        let image = render_modules(&code, params)?;
        tracing::debug!(
            version = ?code.version(),
            modules = code.width(),
            width = image.width(),
            "rasterized QR code"
        );
        Ok(image)
    }
}

fn encode(text: &str, params: &RasterParams) -> Result<QrCode> {
    QrCode::with_error_correction_level(text.as_bytes(), params.error_correction.into())
        .map_err(|e| QrError::encoding("QR code", e))
}

fn render_modules(code: &QrCode, params: &RasterParams) -> Result<RgbaImage> {
    let modules = code.width();
    let colors = code.to_colors();
    let too_large = || {
        QrError::InvalidInput(format!(
            "QR raster would exceed {} pixels per side",
            MAX_RASTER_SIDE
        ))
    };

    let total = params
        .margin
        .checked_mul(2)
        .and_then(|m| m.checked_add(modules as u32))
        .ok_or_else(too_large)?;

    let (size, scale) = if params.width >= total {
        (params.width, params.width as f64 / total as f64)
    } else {
        let size = total
            .checked_mul(FALLBACK_MODULE_PIXELS)
            .ok_or_else(too_large)?;
        (size, FALLBACK_MODULE_PIXELS as f64)
    };
    if size > MAX_RASTER_SIDE {
        return Err(too_large());
    }
    let scaled_margin = params.margin as f64 * scale;
    let inner_end = size as f64 - scaled_margin;

    let is_dark = |px: u32, py: u32| -> bool {
        let (x, y) = (px as f64, py as f64);
        if x < scaled_margin || y < scaled_margin || x >= inner_end || y >= inner_end {
            return false; // Quiet zone
        }
        let col = (((x - scaled_margin) / scale) as usize).min(modules - 1);
        let row = (((y - scaled_margin) / scale) as usize).min(modules - 1);
        colors[row * modules + col] == Color::Dark
    };

    Ok(RgbaImage::from_fn(size, size, |x, y| {
        if is_dark(x, y) {
            params.dark
        } else {
            params.light
        }
    }))
}
