//! Export of crop results.
//!
//! Crops may carry transparency (shape masks, rotated corners), so results
//! are exported as PNG.
//!
//! # Examples
//!
//! ```ignore
//! use cropframe_core::encode::encode_png;
//!
//! let png_bytes = encode_png(&cropped)?;
//! std::fs::write("crop.png", png_bytes)?;
//! ```

mod png;

pub use png::{encode_png, EncodeError};
