//! # Image Probing
//!
//! Reads the pixel dimensions of an inline image so an `image` element
//! without `naturalWidth`/`naturalHeight` can still size itself. Sources are
//! `data:image/...;base64,...` URIs or raw base64. Only the header is parsed;
//! pixels are never decoded.

use std::io::Cursor;

use base64::Engine;

use crate::error::ImageError;

/// Width and height in pixels of the image encoded in `src`.
pub fn probe_dimensions(src: &str) -> Result<(u32, u32), ImageError> {
    let bytes = read_source_bytes(src)?;
    if bytes.len() < 4 {
        return Err(ImageError::TooShort);
    }
    let reader = image::io::Reader::new(Cursor::new(bytes)).with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// Resolve the source string to raw image bytes.
fn read_source_bytes(src: &str) -> Result<Vec<u8>, ImageError> {
    let encoded = if src.starts_with("data:") {
        let comma = src.find(',').ok_or(ImageError::InvalidDataUri)?;
        &src[comma + 1..]
    } else {
        src
    };
    // Tolerate line-wrapped base64.
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(base64::engine::general_purpose::STANDARD.decode(compact)?)
}
