//! Image encoding WASM bindings.

use crate::types::JsRasterImage;
use wasm_bindgen::prelude::*;

/// Encode an image as PNG bytes.
///
/// # Example
///
/// ```typescript
/// const png = encode_png(session.crop());
/// const blob = new Blob([png], { type: 'image/png' });
/// ```
#[wasm_bindgen]
pub fn encode_png(image: &JsRasterImage) -> Result<Vec<u8>, JsValue> {
    image.to_png()
}
