//! Single-touch gesture handling.
//!
//! A touch lands on one of three targets, picked in this order:
//!
//! 1. the rotation dial
//! 2. the crop box edge band, `hot_area_unit` wide and centered on the frame
//! 3. the image body anywhere else in the view (pan)

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::{Point, Rect};
use crate::view_model::{CropBoxEdge, CropViewStatus};

use super::viewport::DEFAULT_CONTAINS_TOLERANCE;
use super::{CropView, CropViewEvent};

/// What a touch point hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TouchTarget {
    RotationDial,
    CropBox,
    Image,
    Outside,
}

impl CropView {
    pub fn hit_test(&self, point: Point) -> TouchTarget {
        if let Some(dial) = self.overlay.dial_frame {
            if !self.overlay.dial_hidden && dial.contains_point(point) {
                return TouchTarget::RotationDial;
            }
        }

        if self.is_hit_crop_box(point) {
            return TouchTarget::CropBox;
        }

        if Rect::from_size(self.bounds).contains_point(point) {
            return TouchTarget::Image;
        }

        TouchTarget::Outside
    }

    fn is_hit_crop_box(&self, point: Point) -> bool {
        let half = self.config.hot_area_unit / 2.0;
        let frame = self.overlay.frame;
        frame.inset_by(-half, -half).contains_point(point)
            && !frame.inset_by(half, half).contains_point(point)
    }

    /// Start a gesture at `point`.
    pub fn touch_began(&mut self, point: Point) -> TouchTarget {
        let target = self.hit_test(point);
        self.last_touch_point = point;

        match target {
            TouchTarget::RotationDial => {
                self.events.push(CropViewEvent::BeganResize);
                self.set_status(CropViewStatus::TouchRotationBoard);
            }
            TouchTarget::CropBox => {
                self.events.push(CropViewEvent::BeganResize);
                self.view_model.prepare_for_crop(point);
                self.flush_model_events();
            }
            TouchTarget::Image => self.set_status(CropViewStatus::TouchImage),
            TouchTarget::Outside => {}
        }

        self.active_touch = match target {
            TouchTarget::Outside => None,
            target => Some(target),
        };
        target
    }

    /// Continue the active gesture.
    pub fn touch_moved(&mut self, point: Point) {
        match self.active_touch {
            Some(TouchTarget::CropBox) => self.update_crop_box_frame(point),
            Some(TouchTarget::Image) => {
                let delta = point - self.last_touch_point;
                self.viewport.pan_by(delta);
                self.viewport.check_content_offset();
            }
            _ => {}
        }
        self.last_touch_point = point;
    }

    /// Finish the active gesture.
    pub fn touch_ended(&mut self) {
        let Some(target) = self.active_touch.take() else {
            return;
        };

        match target {
            TouchTarget::CropBox if self.view_model.need_crop() => {
                self.overlay.highlighted_edge = CropBoxEdge::None;
                self.adjust_ui_for_new_crop(self.content_bounds(), true);
                self.events.push(CropViewEvent::EndedResize);
                self.set_status(CropViewStatus::BetweenOperation);
                self.viewport.update_min_zoom_scale();
            }
            TouchTarget::CropBox | TouchTarget::RotationDial => {
                self.events.push(CropViewEvent::EndedResize);
                self.set_status(CropViewStatus::BetweenOperation);
            }
            TouchTarget::Image => {
                self.make_sure_image_contains_crop_overlay();
                self.events.push(CropViewEvent::ImageTransformed);
                self.set_status(CropViewStatus::BetweenOperation);
            }
            TouchTarget::Outside => {}
        }
    }

    /// Resize the crop box for a drag now at `point`.
    ///
    /// Candidates outside the content bounds or below the minimum size are
    /// dropped. A free-ratio candidate that leaves the image is clamped back
    /// onto the previous frame one axis at a time.
    pub fn update_crop_box_frame(&mut self, point: Point) {
        let content_bounds = self.content_bounds();
        if !content_bounds.contains_point(point) {
            return;
        }
        if !self.viewport.image_frame().contains_point(point) {
            return;
        }

        let min_size = self.config.min_crop_box_size;
        let candidate = self.view_model.new_crop_box_frame(
            point,
            content_bounds,
            self.aspect_ratio_lock_enabled,
        );

        if candidate.width < min_size
            || candidate.height < min_size
            || candidate.min_x() < content_bounds.min_x()
            || candidate.max_x() > content_bounds.max_x()
            || candidate.min_y() < content_bounds.min_y()
            || candidate.max_y() > content_bounds.max_y()
        {
            trace!(?candidate, "Rejected crop box outside content bounds");
            return;
        }

        if self.viewport.contains(&candidate, DEFAULT_CONTAINS_TOLERANCE) {
            self.set_crop_box_frame(candidate);
            return;
        }

        if self.aspect_ratio_lock_enabled {
            trace!(?candidate, "Rejected locked crop box leaving the image");
            return;
        }

        let current = self.view_model.crop_box_frame();
        let min_x = current.min_x().max(candidate.min_x());
        let min_y = current.min_y().max(candidate.min_y());
        let max_x = current.max_x().min(candidate.max_x());
        let max_y = current.max_y().min(candidate.max_y());

        let fallbacks = [
            Rect::new(min_x, min_y, candidate.width, max_y - min_y),
            Rect::new(min_x, min_y, max_x - min_x, candidate.height),
            Rect::new(candidate.min_x(), min_y, candidate.width, max_y - min_y),
            Rect::new(min_x, candidate.min_y(), max_x - min_x, candidate.height),
        ];
        let frame = fallbacks
            .into_iter()
            .find(|rect| {
                content_bounds.contains_rect(rect)
                    && self.viewport.contains(rect, DEFAULT_CONTAINS_TOLERANCE)
            })
            .unwrap_or(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y));
        self.set_crop_box_frame(frame);
    }
}
