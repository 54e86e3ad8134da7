//! Producing the crop from the current view state.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::decode::{RasterImage, SourceImage};
use crate::geometry::{Point, Size};
use crate::mask::{apply_shape_mask, CropBorder, CropShapeType};
use crate::transform::{crop_image, expected_crop_size, CropError, CropInfo, Transformation};

use super::CropView;

/// Result of a crop together with the state it was taken from.
#[derive(Debug)]
pub struct CropOutput {
    pub image: Result<RasterImage, CropError>,
    pub transformation: Transformation,
    pub crop_info: CropInfo,
}

/// A crop rasterizing on a background thread.
#[derive(Debug)]
pub struct PendingCrop {
    receiver: Receiver<CropOutput>,
}

impl PendingCrop {
    /// The result if it is ready. Yields it at most once.
    pub fn try_take(&self) -> Option<CropOutput> {
        match self.receiver.try_recv() {
            Ok(output) => Some(output),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Block until the result is ready.
    pub fn wait(self) -> Option<CropOutput> {
        self.receiver.recv().ok()
    }
}

/// Hand a finished crop to its [`PendingCrop`].
///
/// Returns false when the pending crop was dropped before delivery.
fn send_output(sender: &Sender<CropOutput>, output: CropOutput) -> bool {
    match sender.send(output) {
        Ok(()) => true,
        Err(_) => {
            debug!("Crop receiver dropped, discarding result");
            false
        }
    }
}

/// Rasterize and mask; runs on either thread.
fn render_crop(
    image: &SourceImage,
    crop_info: CropInfo,
    transformation: Transformation,
    shape: &CropShapeType,
    border: &CropBorder,
) -> CropOutput {
    let image = crop_image(image, &crop_info)
        .and_then(|cropped| apply_shape_mask(&cropped, shape, border).map_err(CropError::from));
    if let Err(err) = &image {
        warn!(%err, "Crop failed");
    }
    CropOutput {
        image,
        transformation,
        crop_info,
    }
}

impl CropView {
    /// Crop parameters for the current view state.
    pub fn crop_info(&self) -> CropInfo {
        let container = self.viewport.container_size();
        let image_center = self
            .viewport
            .container_to_view(Point::new(container.width / 2.0, container.height / 2.0));
        let translation = image_center - self.overlay.frame.center();

        let zoom = self.viewport.zoom_scale();
        let (mut scale_x, mut scale_y) = (zoom, zoom);
        let up = self.view_model.is_up_or_upside_down();
        if self.view_model.horizontally_flipped() {
            if up {
                scale_x = -scale_x;
            } else {
                scale_y = -scale_y;
            }
        }
        if self.view_model.vertically_flipped() {
            if up {
                scale_y = -scale_y;
            } else {
                scale_x = -scale_x;
            }
        }

        CropInfo {
            translation,
            rotation: self.view_model.total_radians(),
            scale_x,
            scale_y,
            crop_size: self.overlay.frame.size(),
            image_view_size: container,
        }
    }

    /// Snapshot of the visual state for later replay.
    pub fn make_transformation(&self) -> Transformation {
        Transformation {
            offset: self.viewport.offset(),
            rotation: self.view_model.total_radians(),
            scale: self.viewport.zoom_scale(),
            is_manually_zoomed: self.manual_zoomed,
            initial_maintained_crop_box_frame: self.view_model.initial_crop_box_frame(),
            mask_frame: self.view_model.crop_box_frame(),
            scroll_bounds: self.viewport.scroll_bounds(),
        }
    }

    /// Pixel size the crop would have.
    pub fn expected_crop_image_size(&self) -> Size {
        expected_crop_size(self.image.size(), &self.crop_info())
    }

    /// Crop the image being edited.
    pub fn crop(&self) -> CropOutput {
        self.crop_image(&self.image)
    }

    /// Crop `image` with the current geometry. `image` should have the same
    /// displayed aspect ratio as the edited one.
    pub fn crop_image(&self, image: &SourceImage) -> CropOutput {
        render_crop(
            image,
            self.crop_info(),
            self.make_transformation(),
            &self.config.crop_shape,
            &self.config.border,
        )
    }

    /// Crop on a background thread from a snapshot of the current state.
    pub fn async_crop(&self) -> PendingCrop {
        let image = Arc::clone(&self.image);
        let crop_info = self.crop_info();
        let transformation = self.make_transformation();
        let shape = self.config.crop_shape.clone();
        let border = self.config.border;

        let (sender, receiver) = mpsc::channel();
        debug!(?crop_info, "Dispatching crop");
        thread::spawn(move || {
            let output = render_crop(&image, crop_info, transformation, &shape, &border);
            debug!(ok = output.image.is_ok(), "Crop finished");
            send_output(&sender, output);
        });

        PendingCrop { receiver }
    }
}
