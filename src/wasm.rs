use wasm_bindgen::prelude::*;

use crate::download::{BrowserDownloader, Downloader};
use crate::generate::QrCodeGenerator;
use crate::logo::LogoLoader;
use crate::options::{ColorOptions, LogoOptions, LogoSource, RenderOptions};
use crate::qr::QrcodeRasterizer;

/// Browsers hand logos over as bytes, so only in-memory sources are accepted.
struct InMemoryLoader;

impl LogoLoader for InMemoryLoader {
    fn load(&self, source: &LogoSource) -> crate::Result<image::DynamicImage> {
        match source {
            LogoSource::Bytes(bytes) => image::load_from_memory(bytes)
                .map_err(|e| crate::QrError::image_load(source.to_string(), e)),
            other => Err(crate::QrError::image_load(
                other.to_string(),
                "only in-memory logos can be loaded in the browser",
            )),
        }
    }
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn generator() -> QrCodeGenerator<QrcodeRasterizer, InMemoryLoader> {
    console_error_panic_hook::set_once();
    QrCodeGenerator::with_parts(QrcodeRasterizer, InMemoryLoader)
}

fn base_options(size: u32, margin: u32, dark: String, light: String) -> RenderOptions {
    RenderOptions {
        size,
        margin,
        color: ColorOptions { dark, light },
        ..Default::default()
    }
}

#[wasm_bindgen(js_name = isValidURL)]
pub fn is_valid_url(url: &str) -> bool {
    crate::url_check::is_valid_url(url)
}

#[wasm_bindgen(js_name = generateQRCode)]
pub fn generate_qr_code(
    url: &str,
    size: u32,
    margin: u32,
    dark: String,
    light: String,
) -> Result<String, JsValue> {
    generator()
        .generate_qr_code(url, &base_options(size, margin, dark, light))
        .map_err(to_js_error)
}

#[wasm_bindgen(js_name = generateQRCodeWithLogo)]
#[allow(clippy::too_many_arguments)]
pub fn generate_qr_code_with_logo(
    url: &str,
    logo: Vec<u8>,
    size: u32,
    margin: u32,
    dark: String,
    light: String,
    logo_width: Option<f32>,
    logo_height: Option<f32>,
    logo_margin: Option<f32>,
    logo_background_color: Option<String>,
    logo_opacity: Option<f32>,
    logo_radius: Option<f32>,
) -> Result<String, JsValue> {
    let mut logo_options = LogoOptions::new(logo);
    logo_options.width = logo_width;
    logo_options.height = logo_height;
    if let Some(margin) = logo_margin {
        logo_options.margin = margin;
    }
    if let Some(color) = logo_background_color {
        logo_options.background_color = color;
    }
    if let Some(opacity) = logo_opacity {
        logo_options.opacity = opacity;
    }
    if let Some(radius) = logo_radius {
        logo_options.radius = radius;
    }

    let options = base_options(size, margin, dark, light).with_logo(logo_options);
    generator()
        .generate_qr_code(url, &options)
        .map_err(to_js_error)
}

#[wasm_bindgen(js_name = downloadQRCode)]
pub fn download_qr_code(data_url: &str, filename: &str) -> Result<(), JsValue> {
    BrowserDownloader
        .download(data_url, filename)
        .map_err(to_js_error)
}
