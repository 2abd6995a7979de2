use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

use crate::error::{QrError, Result};

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";
const DATA_SCHEME: &str = "data:";

pub fn encode_png_data_url(image: &RgbaImage) -> Result<String> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| QrError::encoding("PNG", e))?;

    let mut out = String::with_capacity(PNG_DATA_URL_PREFIX.len() + png.len() * 4 / 3 + 4);
    out.push_str(PNG_DATA_URL_PREFIX);
    BASE64.encode_string(&png, &mut out);
    Ok(out)
}

/// True if `input` starts with the `data:` scheme, in any case.
pub fn is_data_url(input: &str) -> bool {
    input
        .get(..DATA_SCHEME.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(DATA_SCHEME))
}

/// Decodes the payload of a base64 `data:` URL of any media type.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    if !is_data_url(data_url) {
        return Err(QrError::InvalidInput("not a data URL".into()));
    }
    let rest = &data_url[DATA_SCHEME.len()..];
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| QrError::InvalidInput("data URL has no payload".into()))?;

    if !header.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(QrError::InvalidInput(
            "only base64 data URLs are supported".into(),
        ));
    }

    BASE64
        .decode(payload.trim())
        .map_err(|e| QrError::InvalidInput(format!("invalid base64 payload: {}", e)))
}
