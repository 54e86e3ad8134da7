//! Crop box state, rotation/flip state and the interaction state machine.
//!
//! [`CropViewModel`] owns every number that describes the current crop
//! session except the viewport. Mutations that observers care about (the
//! crop box frame and the interaction status) queue exactly one
//! [`ViewModelEvent`] each; the owner drains them with
//! [`CropViewModel::take_events`] right after the mutating call.
//!
//! # Interaction states
//!
//! ```text
//! initial ──► betweenOperation ◄──┬── touchImage
//!                   ▲             ├── touchCropboxHandle(edge)
//!                   │             ├── touchRotationBoard / rotating(angle)
//!                   └─────────────┴── degree90Rotating
//! ```

mod edge;
mod resize;
mod rotation;

use serde::{Deserialize, Serialize};

use crate::geometry::{normalize_radians, Point, Rect};

pub use edge::{crop_edge, CropBoxEdge};
pub use resize::resized_frame;
pub use rotation::{ImageRotationType, RotateDirection};

/// The single active interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CropViewStatus {
    #[default]
    Initial,
    /// Free rotation in progress; `angle` is the new free rotation in radians.
    Rotating { angle: f64 },
    Degree90Rotating,
    TouchImage,
    TouchCropboxHandle { edge: CropBoxEdge },
    TouchRotationBoard,
    BetweenOperation,
}

/// Change notifications queued by the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewModelEvent {
    CropBoxFrameChanged(Rect),
    StatusChanged(CropViewStatus),
}

/// Which way the ratio list should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RatioType {
    Horizontal,
    Vertical,
}

/// Crop session state.
#[derive(Debug, Clone)]
pub struct CropViewModel {
    padding: f64,
    hot_area_unit: f64,

    crop_box_frame: Rect,
    /// Frame when the current drag began.
    crop_box_origin_frame: Rect,
    /// Frame set by the last layout reset.
    initial_crop_box_frame: Rect,
    pan_origin_point: Point,
    tapped_edge: CropBoxEdge,
    status: CropViewStatus,

    radians: f64,
    rotation_type: ImageRotationType,
    aspect_ratio: Option<f64>,

    crop_left_top_on_image: Point,
    crop_right_bottom_on_image: Point,
    horizontally_flipped: bool,
    vertically_flipped: bool,

    events: Vec<ViewModelEvent>,
}

impl CropViewModel {
    /// Create a model for a view with the given padding and hit tolerance.
    pub fn new(padding: f64, hot_area_unit: f64) -> Self {
        Self {
            padding,
            hot_area_unit,
            crop_box_frame: Rect::ZERO,
            crop_box_origin_frame: Rect::ZERO,
            initial_crop_box_frame: Rect::ZERO,
            pan_origin_point: Point::ZERO,
            tapped_edge: CropBoxEdge::None,
            status: CropViewStatus::Initial,
            radians: 0.0,
            rotation_type: ImageRotationType::None,
            aspect_ratio: None,
            crop_left_top_on_image: Point::ZERO,
            crop_right_bottom_on_image: Point::new(1.0, 1.0),
            horizontally_flipped: false,
            vertically_flipped: false,
            events: Vec::new(),
        }
    }

    /// Drain queued notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<ViewModelEvent> {
        std::mem::take(&mut self.events)
    }

    // -- crop box -----------------------------------------------------------

    pub fn crop_box_frame(&self) -> Rect {
        self.crop_box_frame
    }

    pub fn set_crop_box_frame(&mut self, frame: Rect) {
        self.crop_box_frame = frame;
        self.events.push(ViewModelEvent::CropBoxFrameChanged(frame));
    }

    pub fn crop_box_origin_frame(&self) -> Rect {
        self.crop_box_origin_frame
    }

    pub fn initial_crop_box_frame(&self) -> Rect {
        self.initial_crop_box_frame
    }

    /// Start a fresh layout from `frame`.
    pub fn reset_crop_frame(&mut self, frame: Rect) {
        self.initial_crop_box_frame = frame;
        self.crop_box_origin_frame = frame;
        self.set_crop_box_frame(frame);
    }

    /// True when the current drag changed the box.
    pub fn need_crop(&self) -> bool {
        self.crop_box_origin_frame != self.crop_box_frame
    }

    /// Fit a box with the locked aspect ratio inside `reference`.
    ///
    /// Wider ratios than the image shrink the height; narrower ratios shrink
    /// the width. The result keeps `reference`'s center.
    pub fn set_crop_box_frame_by_ratio(&mut self, reference: Rect, image_ratio_h: f64) {
        let Some(ratio) = self.aspect_ratio else {
            self.set_crop_box_frame(reference);
            return;
        };

        let mut size = reference.size();
        if ratio > image_ratio_h {
            size.height = size.width / ratio;
        } else {
            size.width = size.height * ratio;
        }
        self.set_crop_box_frame(Rect::centered_at(reference.center(), size));
    }

    // -- status -------------------------------------------------------------

    pub fn status(&self) -> CropViewStatus {
        self.status
    }

    /// Replace the status and queue one notification.
    pub fn set_status(&mut self, status: CropViewStatus) {
        self.status = status;
        self.events.push(ViewModelEvent::StatusChanged(status));
    }

    pub fn set_initial_status(&mut self) {
        self.set_status(CropViewStatus::Initial);
    }

    pub fn set_rotating_status(&mut self, angle: f64) {
        self.set_status(CropViewStatus::Rotating { angle });
    }

    pub fn set_degree90_rotating_status(&mut self) {
        self.set_status(CropViewStatus::Degree90Rotating);
    }

    pub fn set_touch_image_status(&mut self) {
        self.set_status(CropViewStatus::TouchImage);
    }

    pub fn set_touch_rotation_board_status(&mut self) {
        self.set_status(CropViewStatus::TouchRotationBoard);
    }

    pub fn set_touch_crop_box_handle_status(&mut self) {
        self.set_status(CropViewStatus::TouchCropboxHandle {
            edge: self.tapped_edge,
        });
    }

    pub fn set_between_operation_status(&mut self) {
        self.set_status(CropViewStatus::BetweenOperation);
    }

    // -- drag ---------------------------------------------------------------

    pub fn tapped_edge(&self) -> CropBoxEdge {
        self.tapped_edge
    }

    pub fn pan_origin_point(&self) -> Point {
        self.pan_origin_point
    }

    /// Edge of the current box under `point`.
    pub fn crop_edge(&self, point: Point) -> CropBoxEdge {
        let touch_rect = self
            .crop_box_frame
            .inset_by(-self.hot_area_unit / 2.0, -self.hot_area_unit / 2.0);
        crop_edge(point, touch_rect, self.hot_area_unit)
    }

    /// Record the drag start and enter the matching touch status.
    pub fn prepare_for_crop(&mut self, point: Point) {
        self.pan_origin_point = point;
        self.crop_box_origin_frame = self.crop_box_frame;
        self.tapped_edge = self.crop_edge(point);

        if self.tapped_edge == CropBoxEdge::None {
            self.set_touch_image_status();
        } else {
            self.set_touch_crop_box_handle_status();
        }
    }

    /// Candidate frame for the drag currently at `point`.
    ///
    /// The touch point is kept no further than `padding` outside
    /// `content_frame`; the displacement is rounded up to whole points.
    pub fn new_crop_box_frame(
        &self,
        point: Point,
        content_frame: Rect,
        aspect_ratio_lock_enabled: bool,
    ) -> Rect {
        let point = Point::new(
            point.x.max(content_frame.min_x() - self.padding),
            point.y.max(content_frame.min_y() - self.padding),
        );
        let delta = Point::new(
            (point.x - self.pan_origin_point.x).ceil(),
            (point.y - self.pan_origin_point.y).ceil(),
        );

        let origin = self.crop_box_origin_frame;
        let locked_ratio = if aspect_ratio_lock_enabled && !origin.is_empty() {
            Some(self.aspect_ratio.unwrap_or(origin.width / origin.height))
        } else {
            None
        };

        resized_frame(origin, self.tapped_edge, delta, content_frame, locked_ratio)
    }

    // -- rotation -----------------------------------------------------------

    /// Free rotation in radians, within `[-π, π]`.
    pub fn radians(&self) -> f64 {
        self.radians
    }

    pub fn degrees(&self) -> f64 {
        self.radians.to_degrees()
    }

    pub fn set_radians(&mut self, radians: f64) {
        self.radians = normalize_radians(radians);
    }

    pub fn rotation_type(&self) -> ImageRotationType {
        self.rotation_type
    }

    /// Free rotation plus the quarter turns.
    pub fn total_radians(&self) -> f64 {
        self.radians + self.rotation_type.radians()
    }

    /// Commit a quarter turn; a negative angle turns counter-clockwise.
    pub fn rotate_by_90(&mut self, angle: f64) {
        self.rotation_type = match RotateDirection::from_radians(angle) {
            RotateDirection::Clockwise => self.rotation_type.rotated_clockwise(),
            RotateDirection::Counterclockwise => self.rotation_type.rotated_counterclockwise(),
        };
    }

    pub fn is_up_or_upside_down(&self) -> bool {
        self.rotation_type.is_rotated_by_multiple_180()
    }

    /// Ratio list orientation for an image that is originally horizontal or not.
    pub fn ratio_type(&self, image_is_horizontal: bool) -> RatioType {
        let horizontal = if self.is_up_or_upside_down() {
            image_is_horizontal
        } else {
            !image_is_horizontal
        };
        if horizontal {
            RatioType::Horizontal
        } else {
            RatioType::Vertical
        }
    }

    // -- aspect ratio -------------------------------------------------------

    pub fn aspect_ratio(&self) -> Option<f64> {
        self.aspect_ratio
    }

    /// Lock to `ratio`, or unlock with `None`. Non-positive ratios unlock.
    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) {
        self.aspect_ratio = ratio.filter(|r| r.is_finite() && *r > 0.0);
    }

    // -- anchors and flips --------------------------------------------------

    pub fn crop_left_top_on_image(&self) -> Point {
        self.crop_left_top_on_image
    }

    pub fn crop_right_bottom_on_image(&self) -> Point {
        self.crop_right_bottom_on_image
    }

    pub fn set_anchor_points(&mut self, left_top: Point, right_bottom: Point) {
        self.crop_left_top_on_image = left_top;
        self.crop_right_bottom_on_image = right_bottom;
    }

    pub fn horizontally_flipped(&self) -> bool {
        self.horizontally_flipped
    }

    pub fn vertically_flipped(&self) -> bool {
        self.vertically_flipped
    }

    pub fn toggle_horizontal_flip(&mut self) {
        self.horizontally_flipped = !self.horizontally_flipped;
    }

    pub fn toggle_vertical_flip(&mut self) {
        self.vertically_flipped = !self.vertically_flipped;
    }

    /// Back to the image-derived defaults.
    ///
    /// The aspect ratio survives only when `force_fixed_ratio` is set.
    pub fn reset(&mut self, force_fixed_ratio: bool) {
        self.crop_box_frame = Rect::ZERO;
        self.crop_box_origin_frame = Rect::ZERO;
        self.radians = 0.0;
        self.rotation_type = ImageRotationType::None;
        if !force_fixed_ratio {
            self.aspect_ratio = None;
        }
        self.crop_left_top_on_image = Point::ZERO;
        self.crop_right_bottom_on_image = Point::new(1.0, 1.0);
        self.horizontally_flipped = false;
        self.vertically_flipped = false;
        self.set_initial_status();
    }
}


// =============================================================================
// Property-Based Tests
// =============================================================================
