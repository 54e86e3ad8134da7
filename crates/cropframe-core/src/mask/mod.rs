//! Shape masks for crop output.
//!
//! A crop is always rasterized as a rectangle first. Masking is a separate
//! step that clips the result to the configured shape, optionally stroking a
//! border along the outline.
//!
//! ## Shapes
//!
//! - **Rect / Square**: no clipping
//! - **Ellipse / Circle**: oval inscribed in the image
//! - **Rounded rect**: radius relative to the shorter side
//! - **Diamond / Polygon / Path**: closed polygons in unit-square coordinates
//! - **Heart**: two round lobes and a bottom point

mod render;
mod shape;

use thiserror::Error;

pub use render::{apply_shape_mask, CropBorder};
pub use shape::{CropShapeType, MaskOutline};

/// Errors that can occur while masking.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MaskError {
    /// A path shape needs at least 3 points.
    #[error("Mask path needs at least 3 points, got {count}")]
    TooFewPoints { count: usize },

    /// The outline has no area.
    #[error("Mask outline is degenerate")]
    DegeneratePath,

    /// No raster of this size could be allocated.
    #[error("Invalid mask dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}
