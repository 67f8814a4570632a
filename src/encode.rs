//! Packing a canvas for the wire.
//!
//! The browser stacks each partial image as an `<img>` whose source is
//! a `data:image/png;base64,...` URL, so a canvas goes out as a PNG,
//! Base64 encoded with the standard alphabet.  Transparency is what
//! lets the layers show through each other, so the PNG keeps its
//! alpha channel.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::png::PNGEncoder;
use image::ColorType;

use crate::errors::{MandelError, Result};
use crate::render::Canvas;

/// The canvas as an 8-bit RGBA PNG.
pub fn png(canvas: &Canvas) -> Result<Vec<u8>> {
    let (width, height) = canvas.dimensions();
    let raw: &[u8] = canvas;
    let mut bytes = Vec::new();
    PNGEncoder::new(&mut bytes)
        .encode(raw, width, height, ColorType::RGBA(8))
        .map_err(|e| MandelError::Encoding(e.to_string()))?;
    Ok(bytes)
}

/// The canvas as a Base64-encoded PNG, ready for a `data:` URL.
pub fn base64_png(canvas: &Canvas) -> Result<String> {
    Ok(STANDARD.encode(png(canvas)?))
}
