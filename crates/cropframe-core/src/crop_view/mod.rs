//! Crop view orchestration.
//!
//! [`CropView`] keeps three coordinate systems in step:
//!
//! - the [`Viewport`] (content offset, zoom scale, rotation/flip transform)
//! - the crop box overlay frame in view points ([`CropOverlay`])
//! - the rotation and flip state held by the [`CropViewModel`]
//!
//! Every model mutation queues a [`ViewModelEvent`]; the view drains them
//! right away, updates the overlay, renders the new status and forwards a
//! [`CropViewEvent`] to whoever owns it.
//!
//! ```text
//! view point = viewport.center + T · (zoom · container point − offset − bounds / 2)
//! ```

mod adjust;
mod output;
mod preset;
mod touches;
mod viewport;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CropMaskVisualEffect, CropViewConfig};
use crate::decode::SourceImage;
use crate::geometry::{inscribe, Affine, Point, Rect, Size};
use crate::view_model::{CropBoxEdge, CropViewModel, CropViewStatus, RatioType, ViewModelEvent};

pub use output::{CropOutput, PendingCrop};
pub use touches::TouchTarget;
pub use viewport::Viewport;

/// Tolerance for the anchor comparison in the resettable check.
const ANCHOR_TOLERANCE: f64 = f64::EPSILON * 10.0;

/// Share of the shorter view side taken by the rotation dial.
const DIAL_LENGTH_FACTOR: f64 = 0.6;

/// Notifications for the owner of a [`CropView`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropViewEvent {
    CropBoxFrameChanged(Rect),
    StatusChanged(CropViewStatus),
    BecameResettable,
    BecameUnresettable,
    BeganResize,
    EndedResize,
    /// The user panned or zoomed the image.
    ImageTransformed,
}

/// Grid drawn inside the crop box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GridKind {
    #[default]
    Crop,
    Rotate,
}

/// What covers the image outside the crop box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MaskBackground {
    Dimming,
    VisualEffect { effect: CropMaskVisualEffect },
}

/// Host-renderable overlay state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropOverlay {
    pub frame: Rect,
    /// Width / height of the frame, 1 for a zero-height frame.
    pub crop_ratio: f64,
    pub grid_hidden: bool,
    pub grid_kind: GridKind,
    pub highlighted_edge: CropBoxEdge,
    pub hidden: bool,
    pub background: MaskBackground,
    /// `None` when the dial is disabled.
    pub dial_frame: Option<Rect>,
    pub dial_hidden: bool,
}

impl CropOverlay {
    fn new(effect: CropMaskVisualEffect) -> Self {
        Self {
            frame: Rect::ZERO,
            crop_ratio: 1.0,
            grid_hidden: true,
            grid_kind: GridKind::Crop,
            highlighted_edge: CropBoxEdge::None,
            hidden: false,
            background: visual_effect_background(effect),
            dial_frame: None,
            dial_hidden: false,
        }
    }
}

fn visual_effect_background(effect: CropMaskVisualEffect) -> MaskBackground {
    match effect {
        CropMaskVisualEffect::None => MaskBackground::Dimming,
        effect => MaskBackground::VisualEffect { effect },
    }
}

/// Device orientation of the hosting view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutOrientation {
    #[default]
    Portrait,
    LandscapeLeft,
    LandscapeRight,
}

/// The interactive crop view.
#[derive(Debug)]
pub struct CropView {
    config: CropViewConfig,
    image: Arc<SourceImage>,
    view_model: CropViewModel,
    viewport: Viewport,
    overlay: CropOverlay,

    bounds: Size,
    orientation: LayoutOrientation,

    aspect_ratio_lock_enabled: bool,
    manual_zoomed: bool,
    force_fixed_ratio: bool,
    check_for_force_fixed_ratio: bool,

    active_touch: Option<TouchTarget>,
    last_touch_point: Point,

    events: Vec<CropViewEvent>,
}

impl CropView {
    pub fn new(image: impl Into<Arc<SourceImage>>, config: CropViewConfig) -> Self {
        Self {
            view_model: CropViewModel::new(config.padding, config.hot_area_unit),
            viewport: Viewport::new(config.min_zoom_scale, config.max_zoom_scale),
            overlay: CropOverlay::new(config.mask_visual_effect),
            image: image.into(),
            config,
            bounds: Size::ZERO,
            orientation: LayoutOrientation::Portrait,
            aspect_ratio_lock_enabled: false,
            manual_zoomed: false,
            force_fixed_ratio: false,
            check_for_force_fixed_ratio: false,
            active_touch: None,
            last_touch_point: Point::ZERO,
            events: Vec::new(),
        }
    }

    /// Prepare for first use.
    ///
    /// `always_using_one_ratio` keeps the ratio locked through resets.
    pub fn initial_setup(&mut self, always_using_one_ratio: bool) {
        self.force_fixed_ratio = always_using_one_ratio;
        self.check_image_status_changed();
    }

    pub fn config(&self) -> &CropViewConfig {
        &self.config
    }

    pub fn image(&self) -> &Arc<SourceImage> {
        &self.image
    }

    pub fn view_model(&self) -> &CropViewModel {
        &self.view_model
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn overlay(&self) -> &CropOverlay {
        &self.overlay
    }

    pub fn crop_box_frame(&self) -> Rect {
        self.view_model.crop_box_frame()
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    pub fn orientation(&self) -> LayoutOrientation {
        self.orientation
    }

    /// Resize the hosting view. Call [`Self::adapt_for_crop_box`] or
    /// [`Self::handle_device_rotated`] afterwards to relayout.
    pub fn set_layout(&mut self, bounds: Size, orientation: LayoutOrientation) {
        self.bounds = bounds;
        self.orientation = orientation;
    }

    pub fn aspect_ratio_lock_enabled(&self) -> bool {
        self.aspect_ratio_lock_enabled
    }

    pub fn set_aspect_ratio_lock_enabled(&mut self, enabled: bool) {
        self.aspect_ratio_lock_enabled = enabled;
    }

    pub fn is_manually_zoomed(&self) -> bool {
        self.manual_zoomed
    }

    /// Drain notifications, oldest first.
    pub fn take_events(&mut self) -> Vec<CropViewEvent> {
        std::mem::take(&mut self.events)
    }

    // -- model events -------------------------------------------------------

    /// Apply queued model changes to the overlay and render new statuses.
    fn flush_model_events(&mut self) {
        loop {
            let events = self.view_model.take_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                match event {
                    ViewModelEvent::CropBoxFrameChanged(frame) => {
                        self.handle_crop_box_frame_change(frame);
                        self.events.push(CropViewEvent::CropBoxFrameChanged(frame));
                    }
                    ViewModelEvent::StatusChanged(status) => {
                        self.events.push(CropViewEvent::StatusChanged(status));
                        self.render(status);
                    }
                }
            }
        }
    }

    fn handle_crop_box_frame_change(&mut self, frame: Rect) {
        self.overlay.frame = frame;
        self.overlay.crop_ratio = if frame.height != 0.0 {
            frame.width / frame.height
        } else {
            1.0
        };
    }

    fn set_crop_box_frame(&mut self, frame: Rect) {
        self.view_model.set_crop_box_frame(frame);
        self.flush_model_events();
    }

    fn set_status(&mut self, status: CropViewStatus) {
        self.view_model.set_status(status);
        self.flush_model_events();
    }

    fn render(&mut self, status: CropViewStatus) {
        self.overlay.hidden = false;

        match status {
            CropViewStatus::Initial => self.check_image_status_changed(),
            CropViewStatus::Rotating { angle } => {
                self.view_model.set_radians(angle);
                self.rotate_scroll_view();
            }
            CropViewStatus::Degree90Rotating => {
                self.overlay.background = visual_effect_background(self.config.mask_visual_effect);
                self.overlay.hidden = true;
                self.overlay.dial_hidden = true;
            }
            CropViewStatus::TouchImage => {
                self.overlay.background = MaskBackground::Dimming;
                self.overlay.grid_kind = GridKind::Crop;
                self.overlay.grid_hidden = false;
            }
            CropViewStatus::TouchCropboxHandle { edge } => {
                self.overlay.highlighted_edge = edge;
                self.overlay.dial_hidden = true;
                self.overlay.background = MaskBackground::Dimming;
            }
            CropViewStatus::TouchRotationBoard => {
                self.overlay.grid_kind = GridKind::Rotate;
                self.overlay.grid_hidden = false;
                self.overlay.background = MaskBackground::Dimming;
            }
            CropViewStatus::BetweenOperation => {
                self.overlay.highlighted_edge = CropBoxEdge::None;
                self.overlay.grid_hidden = true;
                self.overlay.dial_hidden = false;
                self.adapt_rotation_dial_to_crop_box();
                self.overlay.background = visual_effect_background(self.config.mask_visual_effect);
                self.check_image_status_changed();
            }
        }
    }

    // -- resettable ---------------------------------------------------------

    fn image_status_changed(&mut self) -> bool {
        if self.view_model.total_radians() != 0.0 {
            return true;
        }

        if self.force_fixed_ratio && self.check_for_force_fixed_ratio {
            self.check_for_force_fixed_ratio = false;
            return self.viewport.zoom_scale() != 1.0;
        }

        let same = |a: Point, b: Point| {
            (a.x - b.x).abs() <= ANCHOR_TOLERANCE && (a.y - b.y).abs() <= ANCHOR_TOLERANCE
        };
        !same(self.image_left_top_anchor_point(), Point::ZERO)
            || !same(self.image_right_bottom_anchor_point(), Point::new(1.0, 1.0))
    }

    fn check_image_status_changed(&mut self) {
        let event = if self.image_status_changed() {
            CropViewEvent::BecameResettable
        } else {
            CropViewEvent::BecameUnresettable
        };
        self.events.push(event);
    }

    /// Crop box corner in normalized container coordinates.
    fn anchor_point(&self, view_point: Point, fallback: Point) -> Point {
        let container = self.viewport.container_size();
        if container.is_empty() {
            return fallback;
        }
        self.viewport
            .view_to_container(view_point)
            .map(|p| Point::new(p.x / container.width, p.y / container.height))
            .unwrap_or(fallback)
    }

    fn image_left_top_anchor_point(&self) -> Point {
        let frame = self.overlay.frame;
        self.anchor_point(
            Point::new(frame.min_x(), frame.min_y()),
            self.view_model.crop_left_top_on_image(),
        )
    }

    fn image_right_bottom_anchor_point(&self) -> Point {
        let frame = self.overlay.frame;
        self.anchor_point(
            Point::new(frame.max_x(), frame.max_y()),
            self.view_model.crop_right_bottom_on_image(),
        )
    }

    fn save_anchor_points(&mut self) {
        let left_top = self.image_left_top_anchor_point();
        let right_bottom = self.image_right_bottom_anchor_point();
        self.view_model.set_anchor_points(left_top, right_bottom);
    }

    // -- layout -------------------------------------------------------------

    fn rotation_dial_height(&self) -> f64 {
        if self.config.show_rotation_dial {
            self.config.rotation_dial_height
        } else {
            0.0
        }
    }

    /// Area the crop box may occupy: the view minus padding and the dial.
    pub fn content_bounds(&self) -> Rect {
        let padding = self.config.padding;
        let dial = self.rotation_dial_height();
        let Size { width, height } = self.bounds;

        match self.orientation {
            LayoutOrientation::Portrait => Rect::new(
                padding,
                padding,
                width - 2.0 * padding,
                height - 2.0 * padding - dial,
            ),
            LayoutOrientation::LandscapeLeft => Rect::new(
                padding,
                padding,
                width - 2.0 * padding - dial,
                height - 2.0 * padding,
            ),
            LayoutOrientation::LandscapeRight => Rect::new(
                padding + dial,
                padding,
                width - 2.0 * padding - dial,
                height - 2.0 * padding,
            ),
        }
    }

    /// Largest box with the displayed image's ratio inside the content bounds.
    pub fn initial_crop_box_rect(&self) -> Rect {
        let size = self.image.size();
        if size.is_empty() {
            return Rect::ZERO;
        }
        let inside = if self.view_model.is_up_or_upside_down() {
            size
        } else {
            size.swapped()
        };
        inscribe(self.content_bounds(), Rect::from_size(inside))
    }

    /// Image width / height as currently displayed.
    pub fn image_ratio_h(&self) -> f64 {
        let ratio = self.image.horizontal_to_vertical_ratio();
        if self.view_model.is_up_or_upside_down() {
            ratio
        } else {
            1.0 / ratio
        }
    }

    pub fn ratio_type(&self, image_is_horizontal: bool) -> RatioType {
        self.view_model.ratio_type(image_is_horizontal)
    }

    /// Unzoomed image size for a crop box laid out at `rect`.
    fn container_size_for(&self, rect: &Rect) -> Size {
        if self.view_model.is_up_or_upside_down() {
            rect.size()
        } else {
            rect.size().swapped()
        }
    }

    /// Lay everything out from scratch for the current view size.
    pub fn adapt_for_crop_box(&mut self) {
        self.reset_ui_frame();
    }

    fn reset_ui_frame(&mut self) {
        let rect = self.initial_crop_box_rect();
        self.view_model.reset_crop_frame(rect);
        self.flush_model_events();

        let container = self.container_size_for(&rect);
        self.viewport.reset_by(rect, container);
        self.setup_rotation_dial();

        if self.aspect_ratio_lock_enabled {
            self.set_fixed_ratio_crop_box(true, None);
        }
    }

    fn setup_rotation_dial(&mut self) {
        if !self.config.show_rotation_dial {
            self.overlay.dial_frame = None;
            return;
        }
        let length = self.bounds.width.min(self.bounds.height) * DIAL_LENGTH_FACTOR;
        let height = self.config.rotation_dial_height;
        let size = match self.orientation {
            LayoutOrientation::Portrait => Size::new(length, height),
            LayoutOrientation::LandscapeLeft | LayoutOrientation::LandscapeRight => {
                Size::new(height, length)
            }
        };
        self.overlay.dial_frame = Some(Rect::from_size(size));
        self.adapt_rotation_dial_to_crop_box();
    }

    fn adapt_rotation_dial_to_crop_box(&mut self) {
        let Some(dial) = self.overlay.dial_frame else {
            return;
        };
        let frame = self.overlay.frame;
        let origin = match self.orientation {
            LayoutOrientation::Portrait => Point::new(
                frame.min_x() + (frame.width - dial.width) / 2.0,
                frame.max_y(),
            ),
            LayoutOrientation::LandscapeLeft => Point::new(
                frame.max_x(),
                frame.min_y() + (frame.height - dial.height) / 2.0,
            ),
            LayoutOrientation::LandscapeRight => Point::new(
                frame.min_x() - dial.width,
                frame.min_y() + (frame.height - dial.height) / 2.0,
            ),
        };
        self.overlay.dial_frame = Some(Rect::new(origin.x, origin.y, dial.width, dial.height));
    }

    // -- rotation -----------------------------------------------------------

    /// Flip scaling for the current quarter-turn parity.
    fn flip_scale(&self, horizontal: bool) -> (f64, f64) {
        if horizontal == self.view_model.is_up_or_upside_down() {
            (-1.0, 1.0)
        } else {
            (1.0, -1.0)
        }
    }

    fn rotate_scroll_view(&mut self) {
        let total = self.view_model.total_radians();
        let mut transform = Affine::rotation(total);
        if self.view_model.horizontally_flipped() {
            let (sx, sy) = self.flip_scale(true);
            transform = transform.scaled(sx, sy);
        }
        if self.view_model.vertically_flipped() {
            let (sx, sy) = self.flip_scale(false);
            transform = transform.scaled(sx, sy);
        }
        self.viewport.set_transform(transform);
        self.update_position(total);
    }

    /// Turn the free rotation to `angle` radians.
    pub fn rotate_dial(&mut self, angle: f64) {
        self.view_model.set_rotating_status(angle);
        self.flush_model_events();
    }

    /// The dial was released.
    pub fn end_dial_rotation(&mut self) {
        self.set_status(CropViewStatus::BetweenOperation);
    }

    /// Quarter turn: `angle` is `±π/2`, negative for counter-clockwise.
    pub fn rotate_by_90(&mut self, angle: f64) {
        self.set_status(CropViewStatus::Degree90Rotating);

        let frame = self.overlay.frame;
        let new_rect = inscribe(
            self.content_bounds(),
            Rect::from_size(frame.size().swapped()),
        );

        let mut new_angle = angle;
        if self.view_model.horizontally_flipped() {
            new_angle = -new_angle;
        }
        if self.view_model.vertically_flipped() {
            new_angle = -new_angle;
        }

        self.set_crop_box_frame(new_rect);
        self.viewport
            .set_transform(self.viewport.transform().rotated(new_angle));
        self.update_position_for_90_rotation(new_angle + self.view_model.radians());

        self.viewport.update_min_zoom_scale();
        self.view_model.rotate_by_90(new_angle);
        debug!(
            angle = new_angle,
            rotation = ?self.view_model.rotation_type(),
            "Rotated by quarter turn"
        );
        self.set_status(CropViewStatus::BetweenOperation);
    }

    // -- flips --------------------------------------------------------------

    pub fn horizontally_flip(&mut self) {
        self.view_model.toggle_horizontal_flip();
        self.flip(true);
        self.check_image_status_changed();
    }

    pub fn vertically_flip(&mut self) {
        self.view_model.toggle_vertical_flip();
        self.flip(false);
        self.check_image_status_changed();
    }

    fn flip(&mut self, horizontal: bool) {
        let (sx, sy) = self.flip_scale(horizontal);
        self.viewport
            .set_transform(self.viewport.transform().scaled(sx, sy));
    }

    // -- ratio --------------------------------------------------------------

    /// Refit the box to the locked ratio inside `crop_box`, or inside the
    /// initial box when `None`.
    pub fn set_fixed_ratio_crop_box(&mut self, zoom: bool, crop_box: Option<Rect>) {
        let reference = crop_box.unwrap_or_else(|| self.initial_crop_box_rect());
        self.view_model
            .set_crop_box_frame_by_ratio(reference, self.image_ratio_h());
        self.flush_model_events();

        self.adjust_ui_for_new_crop(self.content_bounds(), zoom);
        if self.force_fixed_ratio {
            self.check_for_force_fixed_ratio = true;
        }
        self.set_status(CropViewStatus::BetweenOperation);

        self.adapt_rotation_dial_to_crop_box();
        self.viewport.update_min_zoom_scale();
    }

    /// Lock the box to `ratio` (width / height).
    pub fn set_fixed_ratio(&mut self, ratio: f64, zoom: bool) {
        self.aspect_ratio_lock_enabled = true;

        if self.view_model.aspect_ratio() != Some(ratio) {
            self.view_model.set_aspect_ratio(Some(ratio));
            self.set_fixed_ratio_crop_box(zoom, None);
        }
    }

    /// Swap the box orientation by locking to its inverse ratio.
    pub fn handle_alter_cropper_90_degree(&mut self) {
        let frame = self.overlay.frame;
        if frame.width <= 0.0 {
            return;
        }
        self.view_model
            .set_aspect_ratio(Some(frame.height / frame.width));
        self.set_fixed_ratio_crop_box(true, None);
    }

    /// Unlock the ratio; the box keeps its current shape.
    pub fn unlock_ratio(&mut self) {
        self.aspect_ratio_lock_enabled = false;
        self.view_model.set_aspect_ratio(None);
    }

    // -- reset and device rotation ------------------------------------------

    /// Back to the image-derived default state.
    pub fn reset(&mut self) {
        self.aspect_ratio_lock_enabled = self.force_fixed_ratio;
        self.view_model.reset(self.force_fixed_ratio);
        self.flush_model_events();

        self.manual_zoomed = false;
        self.reset_ui_frame();

        self.events.push(CropViewEvent::BecameUnresettable);
        self.events.push(CropViewEvent::EndedResize);
    }

    /// Capture the crop as anchors before the host view is resized.
    pub fn prepare_for_device_rotation(&mut self) {
        self.set_status(CropViewStatus::Degree90Rotating);
        self.save_anchor_points();
    }

    /// Rebuild the layout after [`Self::set_layout`], restoring the crop
    /// captured by [`Self::prepare_for_device_rotation`].
    pub fn handle_device_rotated(&mut self) {
        let rect = self.initial_crop_box_rect();
        self.view_model.reset_crop_frame(rect);
        self.flush_model_events();

        let container = self.container_size_for(&rect);
        self.viewport.reset_by(rect, container);
        self.setup_rotation_dial();
        self.rotate_scroll_view();

        let right_bottom = self.view_model.crop_right_bottom_on_image();
        if right_bottom != Point::ZERO {
            let container = self.viewport.container_size();
            let left_top = self.view_model.crop_left_top_on_image();
            let a = self.viewport.container_to_view(Point::new(
                left_top.x * container.width,
                left_top.y * container.height,
            ));
            let b = self.viewport.container_to_view(Point::new(
                right_bottom.x * container.width,
                right_bottom.y * container.height,
            ));
            self.set_crop_box_frame(Rect::from_corners(a, b));

            self.adjust_ui_for_new_crop(self.content_bounds(), true);
            self.adapt_rotation_dial_to_crop_box();
        }
        self.set_status(CropViewStatus::BetweenOperation);
        debug!(
            bounds = ?self.bounds,
            orientation = ?self.orientation,
            crop_box = ?self.view_model.crop_box_frame(),
            "Adapted to device rotation"
        );
    }

    /// Host pinch zoom.
    pub fn set_zoom_scale(&mut self, zoom: f64) {
        self.viewport.set_zoom_scale(zoom);
        self.viewport.check_content_offset();
        self.manual_zoomed = true;
        self.events.push(CropViewEvent::ImageTransformed);
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::config::CropMaskVisualEffect;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_initial_layout() {
        let view = test_view();
        assert!(view
            .crop_box_frame()
            .approx_eq(&Rect::new(0.0, 0.0, 400.0, 300.0), EPS));
        assert_eq!(view.overlay().frame, view.crop_box_frame());
        assert!((view.overlay().crop_ratio - 4.0 / 3.0).abs() < EPS);
        assert_eq!(view.viewport().zoom_scale(), 1.0);
    }

    #[test]
    fn test_content_bounds_reserve_dial() {
        let mut view = CropView::new(test_image(), CropViewConfig::default());
        view.set_layout(Size::new(400.0, 600.0), LayoutOrientation::Portrait);
        assert_eq!(view.content_bounds(), Rect::new(14.0, 14.0, 372.0, 512.0));

        view.set_layout(Size::new(600.0, 400.0), LayoutOrientation::LandscapeLeft);
        assert_eq!(view.content_bounds(), Rect::new(14.0, 14.0, 512.0, 372.0));

        view.set_layout(Size::new(600.0, 400.0), LayoutOrientation::LandscapeRight);
        assert_eq!(view.content_bounds(), Rect::new(74.0, 14.0, 512.0, 372.0));
    }

    #[test]
    fn test_dial_sits_under_crop_box() {
        let mut view = CropView::new(test_image(), CropViewConfig::default());
        view.set_layout(Size::new(400.0, 600.0), LayoutOrientation::Portrait);
        view.adapt_for_crop_box();

        let frame = view.crop_box_frame();
        let dial = view.overlay().dial_frame.unwrap();
        assert!((dial.width - 240.0).abs() < EPS);
        assert!((dial.min_y() - frame.max_y()).abs() < EPS);
        assert!((dial.mid_x() - frame.mid_x()).abs() < EPS);
    }

    #[test]
    fn test_status_rendering() {
        let mut view = test_view();
        view.set_status(CropViewStatus::TouchRotationBoard);
        assert_eq!(view.overlay().grid_kind, GridKind::Rotate);
        assert!(!view.overlay().grid_hidden);
        assert_eq!(view.overlay().background, MaskBackground::Dimming);

        view.set_status(CropViewStatus::Degree90Rotating);
        assert!(view.overlay().hidden);
        assert!(view.overlay().dial_hidden);

        view.set_status(CropViewStatus::BetweenOperation);
        assert!(!view.overlay().hidden);
        assert!(view.overlay().grid_hidden);
        assert_eq!(
            view.overlay().background,
            MaskBackground::VisualEffect {
                effect: CropMaskVisualEffect::DarkBlur
            }
        );
    }

    #[test]
    fn test_fresh_view_is_not_resettable() {
        let mut view = test_view();
        view.set_status(CropViewStatus::BetweenOperation);
        let events = view.take_events();
        assert_eq!(events.last(), Some(&CropViewEvent::BecameUnresettable));
    }

    #[test]
    fn test_fixed_ratio_square() {
        let mut view = test_view();
        view.set_fixed_ratio(1.0, true);

        assert!(view.aspect_ratio_lock_enabled());
        assert!(view
            .crop_box_frame()
            .approx_eq(&Rect::new(50.0, 0.0, 300.0, 300.0), EPS));
        assert!(view
            .viewport()
            .offset()
            .approx_eq(Point::new(50.0, 0.0), EPS));
        assert!(view
            .take_events()
            .contains(&CropViewEvent::BecameResettable));
    }

    #[test]
    fn test_alter_cropper_swaps_ratio() {
        let mut view = test_view();
        view.set_fixed_ratio(16.0 / 9.0, true);
        view.handle_alter_cropper_90_degree();
        let frame = view.crop_box_frame();
        assert!((frame.width / frame.height - 9.0 / 16.0).abs() < EPS);
    }

    #[test]
    fn test_rotate_by_90_swaps_box() {
        let mut view = test_view();
        view.rotate_by_90(FRAC_PI_2);

        assert!(view
            .crop_box_frame()
            .approx_eq(&Rect::new(87.5, 0.0, 225.0, 300.0), EPS));
        assert!((view.viewport().zoom_scale() - 0.75).abs() < EPS);
        assert!(view
            .viewport()
            .bounds()
            .approx_eq(Size::new(300.0, 225.0), EPS));
        assert_eq!(view.view_model().status(), CropViewStatus::BetweenOperation);
        assert!(!view.view_model().is_up_or_upside_down());
    }

    #[test]
    fn test_four_quarter_turns_round_trip() {
        let mut view = test_view();
        let frame = view.crop_box_frame();
        for _ in 0..4 {
            view.rotate_by_90(FRAC_PI_2);
        }
        assert!(view.crop_box_frame().approx_eq(&frame, EPS));
        assert!((view.viewport().zoom_scale() - 1.0).abs() < EPS);
        assert!(view.view_model().total_radians().abs() < EPS);
        assert!(view
            .viewport()
            .transform()
            .approx_eq(&Affine::IDENTITY, EPS));
    }

    #[test]
    fn test_quarter_turn_with_flip_keeps_transform_consistent() {
        let mut view = test_view();
        view.horizontally_flip();
        view.rotate_by_90(FRAC_PI_2);

        // Rebuilding the transform from the model matches the incremental one
        let incremental = view.viewport().transform();
        view.rotate_scroll_view();
        assert!(view.viewport().transform().approx_eq(&incremental, EPS));
    }

    #[test]
    fn test_flip_twice_restores_transform() {
        let mut view = test_view();
        view.rotate_dial(0.2);
        let before = view.viewport().transform();

        view.horizontally_flip();
        assert!(!view.viewport().transform().approx_eq(&before, EPS));
        view.horizontally_flip();
        assert!(view.viewport().transform().approx_eq(&before, EPS));
    }

    #[test]
    fn test_flip_makes_resettable() {
        let mut view = test_view();
        view.vertically_flip();
        assert_eq!(
            view.take_events().last(),
            Some(&CropViewEvent::BecameResettable)
        );
    }

    #[test]
    fn test_free_rotation_covers_crop_box() {
        let mut view = test_view();
        view.rotate_dial(0.3);

        assert!((view.view_model().radians() - 0.3).abs() < EPS);
        assert!(view.viewport().zoom_scale() > 1.0);
        assert!(view
            .viewport()
            .contains(&view.crop_box_frame(), viewport::DEFAULT_CONTAINS_TOLERANCE));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut view = test_view();
        view.set_fixed_ratio(1.0, true);
        view.rotate_by_90(FRAC_PI_2);
        view.horizontally_flip();
        view.take_events();

        view.reset();
        assert!(view
            .crop_box_frame()
            .approx_eq(&Rect::new(0.0, 0.0, 400.0, 300.0), EPS));
        assert!(!view.aspect_ratio_lock_enabled());
        assert_eq!(view.view_model().aspect_ratio(), None);
        assert!(!view.view_model().horizontally_flipped());
        assert_eq!(view.viewport().transform(), Affine::IDENTITY);

        let events = view.take_events();
        let tail = &events[events.len() - 2..];
        assert_eq!(
            tail,
            [CropViewEvent::BecameUnresettable, CropViewEvent::EndedResize]
        );
    }

    #[test]
    fn test_reset_keeps_forced_ratio() {
        let config = CropViewConfig {
            padding: 0.0,
            show_rotation_dial: false,
            ..CropViewConfig::default()
        };
        let mut view = CropView::new(test_image(), config);
        view.initial_setup(true);
        view.set_layout(Size::new(400.0, 300.0), LayoutOrientation::Portrait);
        view.adapt_for_crop_box();
        view.set_fixed_ratio(1.0, true);

        view.reset();
        assert!(view.aspect_ratio_lock_enabled());
        let frame = view.crop_box_frame();
        assert!((frame.width - frame.height).abs() < EPS);
    }

    #[test]
    fn test_device_rotation_restores_crop() {
        let mut view = test_view();
        view.set_fixed_ratio(1.0, true);
        let frame = view.crop_box_frame();

        view.prepare_for_device_rotation();
        assert!(view
            .view_model()
            .crop_left_top_on_image()
            .approx_eq(Point::new(0.125, 0.0), EPS));

        view.handle_device_rotated();
        assert!(view.crop_box_frame().approx_eq(&frame, EPS));
        assert_eq!(view.view_model().status(), CropViewStatus::BetweenOperation);
    }

    #[test]
    fn test_device_rotation_to_landscape_keeps_anchors() {
        let config = CropViewConfig {
            padding: 0.0,
            show_rotation_dial: false,
            ..CropViewConfig::default()
        };
        let mut view = CropView::new(test_image(), config);
        view.set_layout(Size::new(300.0, 400.0), LayoutOrientation::Portrait);
        view.adapt_for_crop_box();
        view.set_fixed_ratio(1.0, true);

        view.prepare_for_device_rotation();
        let left_top = view.view_model().crop_left_top_on_image();
        view.set_layout(Size::new(400.0, 300.0), LayoutOrientation::LandscapeLeft);
        view.handle_device_rotated();

        let frame = view.crop_box_frame();
        assert!((frame.width - frame.height).abs() < EPS);
        view.prepare_for_device_rotation();
        assert!(view
            .view_model()
            .crop_left_top_on_image()
            .approx_eq(left_top, EPS));
    }

    #[test]
    fn test_empty_image_lays_out_zero_box() {
        let view = test_view_with(SourceImage::new(crate::decode::RasterImage::transparent(0, 0)));
        assert_eq!(view.crop_box_frame(), Rect::ZERO);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
