//! Crop session WASM bindings.
//!
//! A [`JsCropSession`] owns one crop editor. JavaScript forwards layout,
//! pointer and toolbar input to it, draws the overlay and image from the
//! state it reports, and drains its notifications with `takeEvents()`.
//!
//! Crops always run synchronously here: `wasm32-unknown-unknown` has no
//! threads, so an async crop mode in the configuration is ignored.
//!
//! # Example
//!
//! ```typescript
//! const session = new JsCropSession(bytes, { cropView: { padding: 14 } });
//! session.layout(canvas.width, canvas.height, 0);
//! session.viewDidAppear();
//!
//! canvas.onpointerdown = (e) => session.touchBegan(e.offsetX, e.offsetY);
//! canvas.onpointermove = (e) => session.touchMoved(e.offsetX, e.offsetY);
//! canvas.onpointerup = () => session.touchEnded();
//!
//! const png = session.crop().toPng();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use cropframe_core::config::{Config, CropMode};
use cropframe_core::controller::{CropViewController, CropViewControllerDelegate, RatioRequest};
use cropframe_core::crop_view::LayoutOrientation;
use cropframe_core::decode::{self, RasterImage, SourceImage};
use cropframe_core::geometry::{Point, Rect, Size};
use cropframe_core::transform::{CropError, CropInfo, Transformation};
use cropframe_core::view_model::{CropViewStatus, RotateDirection};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::types::JsRasterImage;

/// A notification queued for JavaScript.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub(crate) enum SessionEvent {
    #[serde(rename_all = "camelCase")]
    Cropped {
        transformation: Transformation,
        crop_info: CropInfo,
    },
    CropFailed {
        message: String,
    },
    Cancelled,
    BeganResize,
    #[serde(rename_all = "camelCase")]
    EndedResize {
        crop_info: CropInfo,
    },
    ImageTransformed,
    CropBoxChanged {
        frame: Rect,
    },
    StatusChanged {
        status: CropViewStatus,
    },
}

/// Delegate that records everything for the next `takeEvents()`.
#[derive(Debug, Default)]
struct EventLog {
    events: Vec<SessionEvent>,
    last_crop: Option<RasterImage>,
    last_error: Option<String>,
}

impl CropViewControllerDelegate for EventLog {
    fn did_crop(&mut self, cropped: &RasterImage, transformation: &Transformation, crop_info: &CropInfo) {
        self.last_crop = Some(cropped.clone());
        self.events.push(SessionEvent::Cropped {
            transformation: *transformation,
            crop_info: *crop_info,
        });
    }

    fn did_fail_to_crop(&mut self, error: &CropError) {
        let message = error.to_string();
        self.last_error = Some(message.clone());
        self.events.push(SessionEvent::CropFailed { message });
    }

    fn did_cancel(&mut self) {
        self.events.push(SessionEvent::Cancelled);
    }

    fn did_begin_resize(&mut self) {
        self.events.push(SessionEvent::BeganResize);
    }

    fn did_end_resize(&mut self, crop_info: &CropInfo) {
        self.events.push(SessionEvent::EndedResize {
            crop_info: *crop_info,
        });
    }

    fn did_image_transformed(&mut self) {
        self.events.push(SessionEvent::ImageTransformed);
    }

    fn did_change_crop_box(&mut self, frame: Rect) {
        self.events.push(SessionEvent::CropBoxChanged { frame });
    }

    fn did_change_status(&mut self, status: CropViewStatus) {
        self.events.push(SessionEvent::StatusChanged { status });
    }
}

/// A ratio preset as shown in a picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct RatioEntry {
    name: String,
    ratio: f64,
}

/// Answer to the set-ratio button.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub(crate) enum RatioResponse {
    Unlocked,
    Applied { ratio: f64 },
    Choose { ratios: Vec<RatioEntry> },
    NoRatios,
}

impl From<RatioRequest> for RatioResponse {
    fn from(request: RatioRequest) -> Self {
        match request {
            RatioRequest::Unlocked => Self::Unlocked,
            RatioRequest::Applied(ratio) => Self::Applied { ratio },
            RatioRequest::Choose(manager) => {
                let ratio_type = manager.ratio_type();
                Self::Choose {
                    ratios: manager
                        .ratios()
                        .iter()
                        .map(|item| RatioEntry {
                            name: item.name(ratio_type).to_string(),
                            ratio: item.ratio(ratio_type),
                        })
                        .collect(),
                }
            }
            RatioRequest::NoRatios => Self::NoRatios,
        }
    }
}

/// Convert a u8 layout orientation value to the core enum.
///
/// Values:
/// - 0 = Portrait
/// - 1 = Landscape left
/// - 2 = Landscape right
///
/// Any other value defaults to Portrait.
pub(crate) fn orientation_from_u8(value: u8) -> LayoutOrientation {
    match value {
        1 => LayoutOrientation::LandscapeLeft,
        2 => LayoutOrientation::LandscapeRight,
        _ => LayoutOrientation::Portrait,
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// One crop editor.
#[wasm_bindgen]
pub struct JsCropSession {
    controller: CropViewController,
    log: Rc<RefCell<EventLog>>,
    laid_out: bool,
}

#[wasm_bindgen]
impl JsCropSession {
    /// Decode `bytes` and open an editor on it.
    ///
    /// # Arguments
    /// * `bytes` - JPEG or PNG file bytes
    /// * `config` - Configuration object; missing fields take defaults
    #[wasm_bindgen(constructor)]
    pub fn new(bytes: &[u8], config: JsValue) -> Result<JsCropSession, JsValue> {
        let config: Config = if config.is_undefined() || config.is_null() {
            Config::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };
        let image = decode::decode_image(bytes).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Self::with_config(image, config).map_err(|e| JsValue::from_str(&e))
    }

    /// Lay the editor out in a `width` x `height` view.
    ///
    /// The first call sets up the editor; later calls with a different size
    /// or orientation keep the crop like a device rotation does.
    pub fn layout(&mut self, width: f64, height: f64, orientation: u8) {
        let size = Size::new(width, height);
        let orientation = orientation_from_u8(orientation);
        if !self.laid_out {
            self.laid_out = true;
            self.controller.view_did_layout(size, orientation);
        } else {
            self.controller.view_will_transition(size, orientation);
        }
    }

    /// Replay the configured preset once the editor is shown.
    #[wasm_bindgen(js_name = viewDidAppear)]
    pub fn view_did_appear(&mut self) {
        self.controller.view_did_appear();
    }

    /// Start a pointer gesture; returns what was hit.
    #[wasm_bindgen(js_name = touchBegan)]
    pub fn touch_began(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        let target = self.controller.touch_began(Point::new(x, y));
        to_js(&target)
    }

    #[wasm_bindgen(js_name = touchMoved)]
    pub fn touch_moved(&mut self, x: f64, y: f64) {
        self.controller.touch_moved(Point::new(x, y));
    }

    #[wasm_bindgen(js_name = touchEnded)]
    pub fn touch_ended(&mut self) {
        self.controller.touch_ended();
    }

    /// Quarter turn.
    pub fn rotate(&mut self, clockwise: bool) {
        let direction = if clockwise {
            RotateDirection::Clockwise
        } else {
            RotateDirection::Counterclockwise
        };
        self.controller.rotate(direction);
    }

    /// Free rotation from the dial, in radians.
    #[wasm_bindgen(js_name = rotateDial)]
    pub fn rotate_dial(&mut self, angle: f64) {
        self.controller.rotate_dial(angle);
    }

    #[wasm_bindgen(js_name = endDialRotation)]
    pub fn end_dial_rotation(&mut self) {
        self.controller.end_dial_rotation();
    }

    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, zoom: f64) {
        self.controller.set_zoom_scale(zoom);
    }

    #[wasm_bindgen(js_name = flipHorizontal)]
    pub fn flip_horizontal(&mut self) {
        self.controller.horizontally_flip();
    }

    #[wasm_bindgen(js_name = flipVertical)]
    pub fn flip_vertical(&mut self) {
        self.controller.vertically_flip();
    }

    /// Swap the crop box between portrait and landscape.
    #[wasm_bindgen(js_name = alterCropper)]
    pub fn alter_cropper(&mut self) {
        self.controller.alter_cropper_90_degree();
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    /// Press the set-ratio button.
    ///
    /// Returns `{ type: "unlocked" | "applied" | "choose" | "noRatios" }`;
    /// `choose` carries the presets to offer.
    #[wasm_bindgen(js_name = setRatio)]
    pub fn set_ratio(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.ratio_response())
    }

    /// Lock the crop box to a picked ratio (width / height).
    #[wasm_bindgen(js_name = setFixedRatio)]
    pub fn set_fixed_ratio(&mut self, ratio: f64) {
        self.controller.set_fixed_ratio(ratio, false);
    }

    /// Overlay state to draw: crop frame, grid, dial and mask background.
    pub fn overlay(&self) -> Result<JsValue, JsValue> {
        to_js(self.controller.crop_view().overlay())
    }

    /// Container-to-view transform for drawing the decoded image.
    #[wasm_bindgen(js_name = imageTransform)]
    pub fn image_transform(&self) -> Result<JsValue, JsValue> {
        to_js(
            &self
                .controller
                .crop_view()
                .viewport()
                .container_to_view_transform(),
        )
    }

    #[wasm_bindgen(js_name = cropInfo)]
    pub fn crop_info(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.crop_info())
    }

    /// State to pass back as `cropView.presetTransformation` later.
    pub fn transformation(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.transformation())
    }

    #[wasm_bindgen(js_name = expectedCropSize)]
    pub fn expected_crop_size(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.expected_crop_image_size())
    }

    /// Rasterize the crop.
    pub fn crop(&mut self) -> Result<JsRasterImage, JsValue> {
        self.crop_raster()
            .map(JsRasterImage::from_raster)
            .map_err(|e| JsValue::from_str(&e))
    }

    pub fn cancel(&mut self) {
        self.controller.cancel();
    }

    /// Drain queued notifications.
    #[wasm_bindgen(js_name = takeEvents)]
    pub fn take_events(&mut self) -> Result<JsValue, JsValue> {
        let events = std::mem::take(&mut self.log.borrow_mut().events);
        to_js(&events)
    }
}

impl JsCropSession {
    pub(crate) fn with_config(image: SourceImage, mut config: Config) -> Result<Self, String> {
        config.validate().map_err(|e| e.to_string())?;
        config.crop_mode = CropMode::Sync;

        let log = Rc::new(RefCell::new(EventLog::default()));
        let mut controller = CropViewController::new(image, config);
        controller.set_delegate(&log);
        controller.view_did_load();

        Ok(Self {
            controller,
            log,
            laid_out: false,
        })
    }

    fn crop_raster(&mut self) -> Result<RasterImage, String> {
        self.controller.crop();
        let mut log = self.log.borrow_mut();
        match log.last_crop.take() {
            Some(image) => Ok(image),
            None => Err(log
                .last_error
                .take()
                .unwrap_or_else(|| "Crop produced no image".to_string())),
        }
    }

    fn ratio_response(&mut self) -> RatioResponse {
        self.controller.handle_set_ratio().into()
    }
}
