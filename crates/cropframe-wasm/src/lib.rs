//! Cropframe WASM - WebAssembly bindings for Cropframe
//!
//! This crate exposes the cropframe-core crop editor to JavaScript/TypeScript
//! applications.
//!
//! # Module Structure
//!
//! - `session` - The interactive crop editor (`JsCropSession`)
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Image decoding bindings (JPEG, PNG with EXIF orientation)
//! - `encode` - Image encoding bindings (PNG export)
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropSession } from '@cropframe/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const session = new JsCropSession(bytes, undefined);
//! session.layout(800, 600, 0);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod session;
mod types;

// Re-export public types
pub use decode::decode_image;
pub use encode::encode_png;
pub use session::JsCropSession;
pub use types::JsRasterImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("cropframe-wasm ready"));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
