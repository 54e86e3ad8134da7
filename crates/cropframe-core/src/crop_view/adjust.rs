//! Viewport refits after the crop box or the rotation changed.

use crate::geometry::{inscribe, rotated_bounding_size, Rect};

use super::CropView;

/// Slack used when checking that the image still covers the overlay.
const OVERLAY_CONTAINS_TOLERANCE: f64 = 0.25;

impl CropView {
    /// Resize the viewport to the rotated bounding box of the overlay and
    /// make the image cover it again.
    pub(super) fn update_position(&mut self, radians: f64) {
        let size = rotated_bounding_size(self.overlay.frame.size(), radians);
        self.viewport.update_layout(size);

        if !self.manual_zoomed || self.viewport.should_scale() {
            self.viewport.zoom_scale_to_bound();
            self.manual_zoomed = false;
        } else {
            self.viewport.update_min_zoom_scale();
        }

        self.viewport.check_content_offset();
    }

    /// Like [`Self::update_position`] for a quarter turn, keeping the
    /// apparent image scale.
    pub(super) fn update_position_for_90_rotation(&mut self, radians: f64) {
        let bounding = rotated_bounding_size(self.overlay.frame.size(), radians);
        // The rotation type is not committed yet
        let size = if self.view_model.is_up_or_upside_down() {
            bounding
        } else {
            bounding.swapped()
        };

        let old_width = self.viewport.bounds().width;
        let scale = if old_width > 0.0 {
            size.width / old_width
        } else {
            1.0
        };
        self.viewport.update_layout(size);

        let zoom = self.viewport.zoom_scale() * scale;
        self.viewport.set_min_zoom_scale(zoom);
        self.viewport.set_zoom_scale(zoom);
        self.viewport.check_content_offset();
    }

    /// Grow the crop box to fill `content_rect` and zoom the image so the
    /// same region stays inside the box.
    ///
    /// # Arguments
    ///
    /// * `content_rect` - Area the enlarged box must fit in
    /// * `zoom` - Zoom into the previously boxed region
    pub(super) fn adjust_ui_for_new_crop(&mut self, content_rect: Rect, zoom: bool) {
        let crop_box = self.view_model.crop_box_frame();
        if crop_box.is_empty() {
            return;
        }

        let scale = (content_rect.width / crop_box.width).min(content_rect.height / crop_box.height);
        let radians = self.view_model.total_radians();
        let new_bounds = rotated_bounding_size(crop_box.size().scaled(scale), radians);

        let content = rotated_bounding_size(self.viewport.content_size(), radians);
        let mut scale_frame = crop_box;
        if scale_frame.width >= content.width {
            scale_frame.width = content.width;
        }
        if scale_frame.height >= content.height {
            scale_frame.height = content.height;
        }

        self.viewport.update_layout(new_bounds);

        let new_crop_box = inscribe(content_rect, crop_box);
        self.set_crop_box_frame(new_crop_box);

        if zoom {
            if let Some(zoom_rect) = self.viewport.view_rect_to_container(&scale_frame) {
                self.viewport.zoom_to(zoom_rect);
            }
        }
        self.viewport.check_content_offset();
        self.make_sure_image_contains_crop_overlay();

        self.manual_zoomed = true;
    }

    pub(super) fn make_sure_image_contains_crop_overlay(&mut self) {
        if !self
            .viewport
            .contains(&self.overlay.frame, OVERLAY_CONTAINS_TOLERANCE)
        {
            self.viewport.zoom_scale_to_bound();
            self.viewport.check_content_offset();
        }
    }
}
