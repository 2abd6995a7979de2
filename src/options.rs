use image::Rgba;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

use crate::data_url::is_data_url;
use crate::error::{QrError, Result};
use crate::qr::{FALLBACK_MODULE_PIXELS, MAX_MODULES, MAX_RASTER_SIDE};

pub const DEFAULT_SIZE: u32 = 300;
pub const DEFAULT_MARGIN: u32 = 4;
pub const DEFAULT_DARK: &str = "#000000";
pub const DEFAULT_LIGHT: &str = "#ffffff";
pub const DEFAULT_LOGO_SCALE: f32 = 0.2; // Logo side as a fraction of the QR code side
pub const DEFAULT_LOGO_MARGIN: f32 = 5.0;
pub const TRANSPARENT: &str = "transparent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    H,
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => qrcode::EcLevel::L,
            ErrorCorrection::M => qrcode::EcLevel::M,
            ErrorCorrection::Q => qrcode::EcLevel::Q,
            ErrorCorrection::H => qrcode::EcLevel::H,
        }
    }
}

/// Where a logo image comes from.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum LogoSource {
    /// An `http(s)://` or `data:` URL.
    Url(String),
    Path(PathBuf),
    /// Already-fetched encoded image bytes (PNG, JPEG or GIF).
    Bytes(Vec<u8>),
}

impl From<String> for LogoSource {
    fn from(value: String) -> Self {
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") || is_data_url(&value) {
            LogoSource::Url(value)
        } else {
            LogoSource::Path(PathBuf::from(value))
        }
    }
}

impl From<&str> for LogoSource {
    fn from(value: &str) -> Self {
        LogoSource::from(value.to_string())
    }
}

impl From<Vec<u8>> for LogoSource {
    fn from(value: Vec<u8>) -> Self {
        LogoSource::Bytes(value)
    }
}

impl fmt::Display for LogoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogoSource::Url(url) if is_data_url(url) => write!(f, "inline data URL"),
            LogoSource::Url(url) => write!(f, "{}", url),
            LogoSource::Path(path) => write!(f, "{}", path.display()),
            LogoSource::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

impl fmt::Debug for LogoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogoSource({})", self)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColorOptions {
    pub dark: String,
    pub light: String,
}

impl Default for ColorOptions {
    fn default() -> Self {
        Self {
            dark: DEFAULT_DARK.to_string(),
            light: DEFAULT_LIGHT.to_string(),
        }
    }
}

/// Styling for an embedded logo. Unset sizes are derived from the QR code size.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogoOptions {
    /// `path` is accepted as an alias; setting both is rejected as a duplicate field.
    #[serde(alias = "path")]
    pub source: LogoSource,
    /// Defaults to a fifth of the QR code size. `Some(0.0)` is rejected
    /// rather than treated as unset.
    #[serde(default)]
    pub width: Option<f32>,
    /// Defaults to the resolved width. `Some(0.0)` is rejected.
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default = "default_logo_margin")]
    pub margin: f32,
    #[serde(default = "default_logo_background")]
    pub background_color: String,
    #[serde(default = "default_logo_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub radius: f32,
}

fn default_logo_margin() -> f32 {
    DEFAULT_LOGO_MARGIN
}

fn default_logo_background() -> String {
    TRANSPARENT.to_string()
}

fn default_logo_opacity() -> f32 {
    1.0
}

impl LogoOptions {
    pub fn new(source: impl Into<LogoSource>) -> Self {
        Self {
            source: source.into(),
            width: None,
            height: None,
            margin: DEFAULT_LOGO_MARGIN,
            background_color: default_logo_background(),
            opacity: 1.0,
            radius: 0.0,
        }
    }
}

/// Options for a single QR code render.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Side of the square output image in pixels, at most
    /// [`MAX_RASTER_SIDE`]. Zero is rejected.
    pub size: u32,
    /// Quiet zone around the symbol, in modules. Zero means no quiet zone.
    pub margin: u32,
    pub color: ColorOptions,
    /// Defaults to `M` without a logo and `H` with one.
    pub error_correction: Option<ErrorCorrection>,
    pub logo: Option<LogoOptions>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            margin: DEFAULT_MARGIN,
            color: ColorOptions::default(),
            error_correction: None,
            logo: None,
        }
    }
}

/// Parameters handed to a [`crate::qr::QrRasterizer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterParams {
    pub width: u32,
    pub margin: u32,
    pub dark: Rgba<u8>,
    pub light: Rgba<u8>,
    pub error_correction: ErrorCorrection,
}

/// Logo styling with every default applied and every color parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoStyle {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// `None` when the background is fully transparent.
    pub background: Option<Rgba<u8>>,
    pub opacity: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderTarget {
    Plain,
    WithLogo { source: LogoSource, style: LogoStyle },
}

impl RenderOptions {
    pub fn with_logo(mut self, logo: LogoOptions) -> Self {
        self.logo = Some(logo);
        self
    }

    pub fn raster_params(&self) -> Result<RasterParams> {
        if self.size == 0 || self.size > MAX_RASTER_SIDE {
            return Err(QrError::InvalidInput(format!(
                "size must be between 1 and {}, got {}",
                MAX_RASTER_SIDE, self.size
            )));
        }

        // A symbol that does not fit is drawn at a fixed module size, so the
        // largest symbol plus its quiet zone must stay within the cap.
        let widest = self
            .margin
            .checked_mul(2)
            .and_then(|m| m.checked_add(MAX_MODULES));
        let fits = widest.is_some_and(|w| {
            w <= self.size || w.saturating_mul(FALLBACK_MODULE_PIXELS) <= MAX_RASTER_SIDE
        });
        if !fits {
            return Err(QrError::InvalidInput(format!(
                "margin {} is too large for size {}",
                self.margin, self.size
            )));
        }

        let default_level = if self.logo.is_some() {
            ErrorCorrection::H
        } else {
            ErrorCorrection::M
        };

        Ok(RasterParams {
            width: self.size,
            margin: self.margin,
            dark: parse_color(&self.color.dark)?,
            light: parse_color(&self.color.light)?,
            error_correction: self.error_correction.unwrap_or(default_level),
        })
    }

    /// Resolves the logo options against the QR size.
    pub fn target(&self) -> Result<RenderTarget> {
        let Some(logo) = &self.logo else {
            return Ok(RenderTarget::Plain);
        };

        let width = logo.width.unwrap_or(self.size as f32 * DEFAULT_LOGO_SCALE);
        let height = logo.height.unwrap_or(width);
        for (name, value) in [("width", width), ("height", height)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(QrError::InvalidInput(format!(
                    "logo {} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        if !logo.margin.is_finite() || logo.margin < 0.0 {
            return Err(QrError::InvalidInput(format!(
                "logo margin must not be negative, got {}",
                logo.margin
            )));
        }
        if !(0.0..=1.0).contains(&logo.opacity) {
            return Err(QrError::InvalidInput(format!(
                "logo opacity must be between 0 and 1, got {}",
                logo.opacity
            )));
        }
        if !logo.radius.is_finite() || logo.radius < 0.0 {
            return Err(QrError::InvalidInput(format!(
                "logo radius must not be negative, got {}",
                logo.radius
            )));
        }

        let background = if logo.background_color.trim().eq_ignore_ascii_case(TRANSPARENT) {
            None
        } else {
            Some(parse_color(&logo.background_color)?).filter(|c| c[3] > 0)
        };

        Ok(RenderTarget::WithLogo {
            source: logo.source.clone(),
            style: LogoStyle {
                width,
                height,
                margin: logo.margin,
                background,
                opacity: logo.opacity,
                radius: logo.radius,
            },
        })
    }
}

/// Parses a CSS color string such as `#000000ff`, `rgb(0 0 0)` or `white`.
pub fn parse_color(input: &str) -> Result<Rgba<u8>> {
    let color = csscolorparser::parse(input.trim())
        .map_err(|e| QrError::InvalidInput(format!("invalid color {:?}: {}", input, e)))?;
    Ok(Rgba(color.to_rgba8()))
}
