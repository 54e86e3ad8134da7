//! Image decoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image } from '@cropframe/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const preview = decode_image(bytes);
//! ctx.putImageData(preview.toImageData(), 0, 0);
//! ```

use crate::types::JsRasterImage;
use cropframe_core::decode::{self, DecodeError, RasterImage};
use wasm_bindgen::prelude::*;

/// Decode a JPEG or PNG image with its EXIF orientation applied.
///
/// The result is what the crop session displays, so hosts can draw it with
/// the session's image transform.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image or are corrupted.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsRasterImage, JsValue> {
    decode_oriented(bytes)
        .map(JsRasterImage::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn decode_oriented(bytes: &[u8]) -> Result<RasterImage, DecodeError> {
    let source = decode::decode_image(bytes)?;
    Ok(source
        .normalized()
        .map(|raster| raster.into_owned())
        .unwrap_or_else(|| RasterImage::transparent(0, 0)))
}
