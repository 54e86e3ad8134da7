//! Replaying saved crop state.
//!
//! A [`Transformation`] captured on one screen size is rescaled to the
//! current content bounds before it is applied. A normalized rectangle is
//! turned into an equivalent transformation first.

use tracing::debug;

use crate::config::PresetTransformation;
use crate::geometry::{Point, Rect};
use crate::transform::Transformation;
use crate::view_model::CropViewStatus;

use super::CropView;

impl CropView {
    /// Apply `transformation` as-is.
    ///
    /// # Arguments
    ///
    /// * `transformation` - State already scaled to the current layout
    /// * `rotate_dial` - Also move the rotation dial to the new box
    pub fn transform(&mut self, transformation: &Transformation, rotate_dial: bool) {
        self.view_model.set_rotating_status(transformation.rotation);
        self.flush_model_events();

        if transformation.scroll_bounds != Rect::ZERO {
            self.viewport.set_scroll_bounds(transformation.scroll_bounds);
        }

        self.manual_zoomed = transformation.is_manually_zoomed;
        self.viewport.set_zoom_scale(transformation.scale);
        self.viewport.set_offset(transformation.offset);
        self.set_status(CropViewStatus::BetweenOperation);

        if transformation.mask_frame != Rect::ZERO {
            self.set_crop_box_frame(transformation.mask_frame);
        }

        if rotate_dial {
            self.adapt_rotation_dial_to_crop_box();
        }
    }

    /// Rescale a saved transformation to the current content bounds.
    ///
    /// The saved mask frame is fitted into the content bounds and centered
    /// on the initial crop box; offset and scroll bounds scale along.
    pub fn transform_info_by_transformation(&self, info: &Transformation) -> Transformation {
        let crop_frame = self.view_model.crop_box_origin_frame();
        let content = self.content_bounds();
        let mask = info.mask_frame;

        if mask.is_empty() || content.is_empty() {
            return *info;
        }

        let (mask_width, mask_height, adjust_scale) =
            if mask.height / mask.width >= content.height / content.width {
                let height = content.height;
                (mask.width / mask.height * height, height, height / mask.height)
            } else {
                let width = content.width;
                (width, mask.height / mask.width * width, width / mask.width)
            };

        Transformation {
            offset: info.offset * adjust_scale,
            mask_frame: Rect::new(
                crop_frame.min_x() + (crop_frame.width - mask_width) / 2.0,
                crop_frame.min_y() + (crop_frame.height - mask_height) / 2.0,
                mask_width,
                mask_height,
            ),
            scroll_bounds: Rect::new(
                info.scroll_bounds.x * adjust_scale,
                info.scroll_bounds.y * adjust_scale,
                info.scroll_bounds.width * adjust_scale,
                info.scroll_bounds.height * adjust_scale,
            ),
            ..*info
        }
    }

    /// Transformation showing `rect`, a fraction of the current crop box.
    pub fn transform_info_by_normalized(&self, rect: &Rect) -> Transformation {
        let crop_frame = self.view_model.crop_box_frame();
        if rect.is_empty() {
            return Transformation {
                scale: 1.0,
                mask_frame: crop_frame,
                ..Transformation::default()
            };
        }

        let scale = (1.0 / rect.width).min(1.0 / rect.height);
        let offset = Point::new(
            crop_frame.width * rect.x * scale,
            crop_frame.height * rect.y * scale,
        );

        let mut mask_frame = crop_frame;
        if rect.width > rect.height {
            mask_frame.height = rect.height * crop_frame.height / rect.width;
            mask_frame.y += (crop_frame.height - mask_frame.height) / 2.0;
        } else if rect.width < rect.height {
            mask_frame.width = rect.width * crop_frame.width / rect.height;
            mask_frame.x += (crop_frame.width - mask_frame.width) / 2.0;
        }

        Transformation {
            offset,
            rotation: 0.0,
            scale,
            is_manually_zoomed: scale != 1.0,
            initial_maintained_crop_box_frame: Rect::ZERO,
            mask_frame,
            scroll_bounds: Rect::ZERO,
        }
    }

    /// Replay the configured preset transformation.
    ///
    /// # Returns
    ///
    /// The transformation that was applied, or `None` without a preset.
    pub fn process_preset_transformation(&mut self) -> Option<Transformation> {
        match self.config.preset_transformation {
            PresetTransformation::None => None,
            PresetTransformation::Transformation { transformation } => {
                let mut scaled = self.transform_info_by_transformation(&transformation);

                // First pass settles the crop box, second fixes the zoom
                self.transform(&scaled, false);

                let initial = self.view_model.crop_box_origin_frame();
                let saved = transformation.mask_frame;
                let maintained = transformation.initial_maintained_crop_box_frame;
                let adjust = if initial.width > 0.0 && saved.width > 0.0 && maintained.width > 0.0
                {
                    (self.view_model.crop_box_frame().width / initial.width)
                        / (saved.width / maintained.width)
                } else {
                    1.0
                };
                scaled.scale *= adjust;
                self.transform(&scaled, true);

                debug!(?transformation, adjust, "Replayed preset transformation");
                Some(transformation)
            }
            PresetTransformation::NormalizedRect { rect } => {
                let transformation = self.transform_info_by_normalized(&rect);
                self.transform(&transformation, true);
                self.viewport.set_frame(transformation.mask_frame);

                debug!(?rect, "Replayed normalized preset");
                Some(transformation)
            }
        }
    }

    /// Lock the ratio after a preset replay.
    ///
    /// A `ratio` of 0 locks the replayed box's own aspect.
    pub fn handle_preset_fixed_ratio(&mut self, ratio: f64, transformation: &Transformation) {
        self.aspect_ratio_lock_enabled = true;

        if ratio == 0.0 {
            let mask = transformation.mask_frame;
            if mask.height > 0.0 {
                self.view_model
                    .set_aspect_ratio(Some(mask.width / mask.height));
            }
        } else {
            self.view_model.set_aspect_ratio(Some(ratio));
            let crop_box = self.view_model.crop_box_frame();
            self.set_fixed_ratio_crop_box(false, Some(crop_box));
        }
    }
}
