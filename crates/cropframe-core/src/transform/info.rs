//! Crop parameter snapshots.

use serde::{Deserialize, Serialize};

use crate::geometry::{Affine, Point, Rect, Size};

/// The numeric input of the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropInfo {
    /// Image view center relative to the crop box center, in view points.
    pub translation: Point,
    /// Total rotation in radians (clockwise on screen).
    pub rotation: f64,
    /// Horizontal zoom; negative when mirrored.
    pub scale_x: f64,
    /// Vertical zoom; negative when mirrored.
    pub scale_y: f64,
    /// Crop box size in view points.
    pub crop_size: Size,
    /// Unzoomed size of the displayed image in view points.
    pub image_view_size: Size,
}

impl CropInfo {
    /// Maps image view points (centered) to crop box points (centered).
    pub fn transform(&self) -> Affine {
        Affine::translation(self.translation.x, self.translation.y)
            .rotated(self.rotation)
            .scaled(self.scale_x, self.scale_y)
    }
}

/// Replayable description of the whole visual crop state.
///
/// Persist it after a crop and hand it back as a preset transformation to
/// reopen the editor exactly where the user left off.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformation {
    /// Viewport content offset.
    pub offset: Point,
    /// Free rotation plus quarter turns, in radians.
    pub rotation: f64,
    /// Viewport zoom scale.
    pub scale: f64,
    pub is_manually_zoomed: bool,
    /// Crop box frame right after the initial layout.
    pub initial_maintained_crop_box_frame: Rect,
    /// Crop box frame at capture time.
    pub mask_frame: Rect,
    /// Viewport bounds at capture time (origin is the content offset).
    pub scroll_bounds: Rect,
}
