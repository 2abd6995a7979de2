pub mod canvas;
pub mod compose;
pub mod data_url;
pub mod download;
pub mod error;
pub mod generate;
pub mod logo;
pub mod options;
pub mod qr;
pub mod url_check;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use compose::{compose, ComposeTarget};
pub use data_url::{decode_data_url, encode_png_data_url, PNG_DATA_URL_PREFIX};
pub use download::{Downloader, FileDownloader, Unsupported};
pub use error::{DownloadError, QrError, Result};
pub use generate::QrCodeGenerator;
pub use logo::{DefaultLogoLoader, LogoLoader};
pub use options::{
    ColorOptions, ErrorCorrection, LogoOptions, LogoSource, LogoStyle, RasterParams,
    RenderOptions, RenderTarget,
};
pub use qr::{QrRasterizer, QrcodeRasterizer};
pub use url_check::is_valid_url;

#[cfg(feature = "wasm")]
pub use download::BrowserDownloader;
