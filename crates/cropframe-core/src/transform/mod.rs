//! Affine rasterization of the final crop.
//!
//! The interactive layer describes a crop as a [`CropInfo`]: where the image
//! view sits relative to the crop box (translation, rotation, signed scale)
//! and how large the crop box and the unzoomed image view are on screen.
//! [`crop_image`] turns that into source pixels.
//!
//! # Coordinate System
//!
//! - Crop space is centered on the crop box, in view points
//! - The image view is centered on its own origin before the transform
//! - Negative scale factors encode flips
//!
//! ```text
//! crop point = translate(t) · rotate(r) · scale(sx, sy) · image view point
//! ```

mod crop;
mod info;
mod sampling;

use thiserror::Error;

use crate::mask::MaskError;

pub use crop::{crop_image, expected_crop_size};
pub use info::{CropInfo, Transformation};
pub use sampling::sample_bilinear;

/// Errors that can occur while producing a crop.
#[derive(Debug, Error)]
pub enum CropError {
    /// The source orientation could not be baked into pixels.
    #[error("Source image could not be normalized")]
    NormalizationFailed,

    /// The computed output has no pixels.
    #[error("Crop output would be empty ({width}x{height})")]
    EmptyOutput { width: u32, height: u32 },

    /// The computed output is not finite or exceeds the pixel cap.
    #[error("Crop output is too large ({width}x{height})")]
    OutputTooLarge { width: f64, height: f64 },

    /// The crop transform has no inverse (zero scale).
    #[error("Crop transform is not invertible")]
    NonInvertibleTransform,

    /// Shape masking of the cropped image failed.
    #[error("Masking failed: {0}")]
    Mask(#[from] MaskError),
}
