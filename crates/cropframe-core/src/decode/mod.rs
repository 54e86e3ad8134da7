//! Source image loading for the crop component.
//!
//! This module provides functionality for:
//! - Decoding JPEG and PNG images into RGBA buffers
//! - Reading the EXIF orientation without applying it
//! - Normalizing orientation into pixel layout before cropping
//!
//! # Examples
//!
//! ```ignore
//! use cropframe_core::decode::decode_image;
//!
//! let bytes = std::fs::read("photo.jpg")?;
//! let source = decode_image(&bytes)?;
//! println!("Displayed size: {:?}", source.size());
//! ```

mod reader;
mod types;

pub use reader::{apply_orientation, decode_image, extract_orientation};
pub use types::{DecodeError, Orientation, RasterImage, SourceImage};
