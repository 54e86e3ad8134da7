//! Command surface of the editor.
//!
//! [`CropViewController`] turns host commands (toolbar buttons, lifecycle
//! calls, touches) into [`CropView`] operations and reports results to a
//! [`CropViewControllerDelegate`] and a [`CropToolbar`].
//!
//! # Lifecycle
//!
//! ```text
//! new → view_did_load → view_did_layout(size) → view_did_appear
//!     → (commands, touches, view_will_transition)* → crop | cancel
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::config::{Config, CropMode, FixedRatiosShowType, PresetFixedRatio, PresetTransformation};
use crate::crop_view::{CropOutput, CropView, CropViewEvent, LayoutOrientation, PendingCrop, TouchTarget};
use crate::decode::{RasterImage, SourceImage};
use crate::geometry::{Point, Rect, Size};
use crate::ratio::FixedRatioManager;
use crate::transform::{CropError, CropInfo, Transformation};
use crate::view_model::{CropViewStatus, RatioType, RotateDirection};

/// Receives the outcome of user actions. Every method defaults to a no-op.
#[allow(unused_variables)]
pub trait CropViewControllerDelegate {
    fn did_crop(&mut self, cropped: &RasterImage, transformation: &Transformation, crop_info: &CropInfo) {}

    fn did_fail_to_crop(&mut self, error: &CropError) {}

    fn did_cancel(&mut self) {}

    fn did_begin_resize(&mut self) {}

    fn did_end_resize(&mut self, crop_info: &CropInfo) {}

    fn did_image_transformed(&mut self) {}

    fn did_change_crop_box(&mut self, frame: Rect) {}

    fn did_change_status(&mut self, status: CropViewStatus) {}
}

/// Host toolbar hooks. Every method defaults to a no-op.
#[allow(unused_variables)]
pub trait CropToolbar {
    fn handle_fixed_ratio_set(&mut self, ratio: f64) {}

    fn handle_fixed_ratio_unset(&mut self) {}

    fn handle_crop_view_did_become_resettable(&mut self) {}

    fn handle_crop_view_did_become_unresettable(&mut self) {}

    /// Whether the ratio picker button should be offered.
    fn set_fixed_ratio_button_visible(&mut self, visible: bool) {}

    fn adapt_for_orientation(&mut self, orientation: LayoutOrientation) {}
}

/// Toolbar for hosts without one.
#[derive(Debug, Default)]
pub struct HeadlessToolbar;

impl CropToolbar for HeadlessToolbar {}

/// Outcome of the set-ratio button.
#[derive(Debug, Clone, PartialEq)]
pub enum RatioRequest {
    /// A locked ratio was released.
    Unlocked,
    /// The only preset was applied.
    Applied(f64),
    /// The host should let the user pick one of these.
    Choose(FixedRatioManager),
    /// No presets are configured.
    NoRatios,
}

/// The crop editor.
pub struct CropViewController {
    config: Config,
    crop_view: CropView,
    toolbar: Box<dyn CropToolbar>,
    delegate: Option<Weak<RefCell<dyn CropViewControllerDelegate>>>,
    initial_layout: bool,
    pending_crop: Option<PendingCrop>,
}

impl std::fmt::Debug for CropViewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CropViewController")
            .field("config", &self.config)
            .field("crop_view", &self.crop_view)
            .field("initial_layout", &self.initial_layout)
            .field("cropping", &self.pending_crop.is_some())
            .finish_non_exhaustive()
    }
}

impl CropViewController {
    /// Create an editor for `image`.
    ///
    /// Circle, square and heart shapes always crop at ratio 1.
    pub fn new(image: SourceImage, mut config: Config) -> Self {
        if let Some(ratio) = config.crop_view.crop_shape.forced_ratio() {
            config.preset_fixed_ratio = PresetFixedRatio::AlwaysUsingOne { ratio };
        }

        Self {
            crop_view: CropView::new(image, config.crop_view.clone()),
            config,
            toolbar: Box::new(HeadlessToolbar),
            delegate: None,
            initial_layout: false,
            pending_crop: None,
        }
    }

    pub fn with_toolbar(mut self, toolbar: Box<dyn CropToolbar>) -> Self {
        self.toolbar = toolbar;
        self
    }

    /// Register the delegate without taking ownership of it.
    pub fn set_delegate<D: CropViewControllerDelegate + 'static>(&mut self, delegate: &Rc<RefCell<D>>) {
        let delegate: Rc<RefCell<dyn CropViewControllerDelegate>> = delegate.clone();
        self.delegate = Some(Rc::downgrade(&delegate));
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn crop_view(&self) -> &CropView {
        &self.crop_view
    }

    fn notify(&self, f: impl FnOnce(&mut dyn CropViewControllerDelegate)) {
        let Some(delegate) = self.delegate.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        if let Ok(mut delegate) = delegate.try_borrow_mut() {
            f(&mut *delegate);
        };
    }

    /// Forward view notifications to the toolbar and the delegate.
    fn dispatch_view_events(&mut self) {
        for event in self.crop_view.take_events() {
            match event {
                CropViewEvent::CropBoxFrameChanged(frame) => {
                    self.notify(|d| d.did_change_crop_box(frame));
                }
                CropViewEvent::StatusChanged(status) => {
                    self.notify(|d| d.did_change_status(status));
                }
                CropViewEvent::BecameResettable => {
                    self.toolbar.handle_crop_view_did_become_resettable();
                    self.notify(|d| d.did_image_transformed());
                }
                CropViewEvent::BecameUnresettable => {
                    self.toolbar.handle_crop_view_did_become_unresettable();
                }
                CropViewEvent::BeganResize => self.notify(|d| d.did_begin_resize()),
                CropViewEvent::EndedResize => {
                    let crop_info = self.crop_view.crop_info();
                    self.notify(|d| d.did_end_resize(&crop_info));
                }
                CropViewEvent::ImageTransformed => self.notify(|d| d.did_image_transformed()),
            }
        }
    }

    // -- lifecycle ----------------------------------------------------------

    pub fn view_did_load(&mut self) {
        self.crop_view
            .initial_setup(self.config.is_always_using_one_ratio());

        match self.config.preset_fixed_ratio {
            PresetFixedRatio::AlwaysUsingOne { ratio } => {
                self.toolbar.set_fixed_ratio_button_visible(false);
                if self.config.crop_view.preset_transformation == PresetTransformation::None {
                    self.set_fixed_ratio(ratio, true);
                }
            }
            PresetFixedRatio::CanUseMultiple { default_ratio } => {
                if default_ratio > 0.0 {
                    self.set_fixed_ratio(default_ratio, true);
                }
                self.toolbar.set_fixed_ratio_button_visible(true);
            }
        }
        self.dispatch_view_events();
    }

    /// The host view has its size. Only the first call lays out; later
    /// size changes go through [`Self::view_will_transition`].
    pub fn view_did_layout(&mut self, bounds: Size, orientation: LayoutOrientation) {
        if self.initial_layout {
            return;
        }
        self.initial_layout = true;
        self.crop_view.set_layout(bounds, orientation);
        self.toolbar.adapt_for_orientation(orientation);
        self.crop_view.adapt_for_crop_box();
        self.dispatch_view_events();
    }

    /// Replay the preset transformation once the view is visible.
    pub fn view_did_appear(&mut self) {
        if let Some(transformation) = self.crop_view.process_preset_transformation() {
            if let PresetFixedRatio::AlwaysUsingOne { ratio } = self.config.preset_fixed_ratio {
                self.toolbar.handle_fixed_ratio_set(ratio);
                self.crop_view
                    .handle_preset_fixed_ratio(ratio, &transformation);
            }
        }
        self.dispatch_view_events();
    }

    /// The host view is changing size or orientation.
    pub fn view_will_transition(&mut self, bounds: Size, orientation: LayoutOrientation) {
        if bounds == self.crop_view.bounds() && orientation == self.crop_view.orientation() {
            return;
        }
        self.crop_view.prepare_for_device_rotation();
        self.crop_view.set_layout(bounds, orientation);
        self.toolbar.adapt_for_orientation(orientation);
        self.crop_view.handle_device_rotated();
        self.dispatch_view_events();
    }

    // -- ratio --------------------------------------------------------------

    fn ratio_type(&self) -> RatioType {
        match self.config.fixed_ratios_show_type {
            FixedRatiosShowType::Adaptive => self
                .crop_view
                .ratio_type(self.crop_view.image().is_horizontal()),
            FixedRatiosShowType::Horizontal => RatioType::Horizontal,
            FixedRatiosShowType::Vertical => RatioType::Vertical,
        }
    }

    /// Presets for the image as currently displayed.
    pub fn fixed_ratio_manager(&self) -> FixedRatioManager {
        FixedRatioManager::new(
            self.ratio_type(),
            self.crop_view.image_ratio_h(),
            self.config.ratio_options,
            &self.config.custom_ratio_items(),
        )
    }

    /// Lock the crop box to `ratio` (width / height).
    pub fn set_fixed_ratio(&mut self, ratio: f64, zoom: bool) {
        self.toolbar.handle_fixed_ratio_set(ratio);
        self.crop_view.set_fixed_ratio(ratio, zoom);
        self.dispatch_view_events();
    }

    fn reset_ratio_button(&mut self) {
        self.crop_view.unlock_ratio();
        self.toolbar.handle_fixed_ratio_unset();
    }

    /// The set-ratio button was pressed.
    pub fn handle_set_ratio(&mut self) -> RatioRequest {
        if self.crop_view.aspect_ratio_lock_enabled() {
            self.reset_ratio_button();
            return RatioRequest::Unlocked;
        }

        let manager = self.fixed_ratio_manager();
        match manager.ratios() {
            [] => RatioRequest::NoRatios,
            [only] => {
                let ratio = only.ratio(manager.ratio_type());
                self.set_fixed_ratio(ratio, true);
                RatioRequest::Applied(ratio)
            }
            _ => RatioRequest::Choose(manager),
        }
    }

    pub fn alter_cropper_90_degree(&mut self) {
        self.crop_view.handle_alter_cropper_90_degree();
        self.dispatch_view_events();
    }

    // -- transform commands -------------------------------------------------

    /// Quarter turn, ignored while one is still being applied.
    pub fn rotate(&mut self, direction: RotateDirection) {
        if self.crop_view.view_model().status() == CropViewStatus::Degree90Rotating {
            debug!(?direction, "Ignored rotation while rotating");
            return;
        }
        self.crop_view.rotate_by_90(direction.radians());
        self.dispatch_view_events();
    }

    pub fn horizontally_flip(&mut self) {
        self.crop_view.horizontally_flip();
        self.dispatch_view_events();
    }

    pub fn vertically_flip(&mut self) {
        self.crop_view.vertically_flip();
        self.dispatch_view_events();
    }

    pub fn reset(&mut self) {
        self.reset_ratio_button();
        self.crop_view.reset();
        self.dispatch_view_events();
    }

    /// The rotation dial moved to `angle` radians.
    pub fn rotate_dial(&mut self, angle: f64) {
        self.crop_view.rotate_dial(angle);
        self.dispatch_view_events();
    }

    pub fn end_dial_rotation(&mut self) {
        self.crop_view.end_dial_rotation();
        self.dispatch_view_events();
    }

    /// Pinch zoom.
    pub fn set_zoom_scale(&mut self, zoom: f64) {
        self.crop_view.set_zoom_scale(zoom);
        self.dispatch_view_events();
    }

    // -- touches ------------------------------------------------------------

    pub fn touch_began(&mut self, point: Point) -> TouchTarget {
        let target = self.crop_view.touch_began(point);
        self.dispatch_view_events();
        target
    }

    pub fn touch_moved(&mut self, point: Point) {
        self.crop_view.touch_moved(point);
        self.dispatch_view_events();
    }

    pub fn touch_ended(&mut self) {
        self.crop_view.touch_ended();
        self.dispatch_view_events();
    }

    // -- results ------------------------------------------------------------

    pub fn cancel(&mut self) {
        self.notify(|d| d.did_cancel());
    }

    /// Crop with the configured mode.
    ///
    /// In async mode the result arrives through [`Self::poll`]. A request
    /// made while another is outstanding is dropped.
    pub fn crop(&mut self) {
        match self.config.crop_mode {
            CropMode::Sync => {
                let output = self.crop_view.crop();
                self.deliver(output);
            }
            CropMode::Async => {
                if self.pending_crop.is_some() {
                    warn!("Ignored crop request while another crop is running");
                    return;
                }
                self.pending_crop = Some(self.crop_view.async_crop());
            }
        }
    }

    /// True while an async crop is outstanding.
    pub fn is_cropping(&self) -> bool {
        self.pending_crop.is_some()
    }

    /// Deliver a finished async crop.
    ///
    /// # Returns
    ///
    /// `true` if a result was delivered by this call.
    pub fn poll(&mut self) -> bool {
        let Some(output) = self.pending_crop.as_ref().and_then(PendingCrop::try_take) else {
            return false;
        };
        self.pending_crop = None;
        self.deliver(output);
        true
    }

    /// Block until the outstanding async crop is delivered.
    pub fn wait_for_crop(&mut self) {
        if let Some(output) = self.pending_crop.take().and_then(PendingCrop::wait) {
            self.deliver(output);
        }
    }

    fn deliver(&self, output: CropOutput) {
        match &output.image {
            Ok(image) => {
                self.notify(|d| d.did_crop(image, &output.transformation, &output.crop_info));
            }
            Err(error) => self.notify(|d| d.did_fail_to_crop(error)),
        }
    }

    /// Crop another image with the current geometry.
    pub fn process(&self, image: &SourceImage) -> Option<RasterImage> {
        self.crop_view.crop_image(image).image.ok()
    }

    pub fn expected_crop_image_size(&self) -> Size {
        self.crop_view.expected_crop_image_size()
    }

    pub fn crop_info(&self) -> CropInfo {
        self.crop_view.crop_info()
    }

    pub fn transformation(&self) -> Transformation {
        self.crop_view.make_transformation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CropViewConfig;
    use crate::mask::CropShapeType;
    use crate::ratio::RatioOptions;

    #[derive(Debug, Default)]
    struct RecordingDelegate {
        cropped: Vec<(u32, u32)>,
        failures: usize,
        cancels: usize,
        began: usize,
        ended: Vec<CropInfo>,
        transformed: usize,
        frames: Vec<Rect>,
    }

    impl CropViewControllerDelegate for RecordingDelegate {
        fn did_crop(&mut self, cropped: &RasterImage, _: &Transformation, _: &CropInfo) {
            self.cropped.push((cropped.width, cropped.height));
        }

        fn did_fail_to_crop(&mut self, _: &CropError) {
            self.failures += 1;
        }

        fn did_cancel(&mut self) {
            self.cancels += 1;
        }

        fn did_begin_resize(&mut self) {
            self.began += 1;
        }

        fn did_end_resize(&mut self, crop_info: &CropInfo) {
            self.ended.push(*crop_info);
        }

        fn did_image_transformed(&mut self) {
            self.transformed += 1;
        }

        fn did_change_crop_box(&mut self, frame: Rect) {
            self.frames.push(frame);
        }
    }

    #[derive(Debug, Default)]
    struct ToolbarState {
        ratio: Option<f64>,
        resettable: bool,
        ratio_button: Option<bool>,
    }

    struct SharedToolbar(Rc<RefCell<ToolbarState>>);

    impl CropToolbar for SharedToolbar {
        fn handle_fixed_ratio_set(&mut self, ratio: f64) {
            self.0.borrow_mut().ratio = Some(ratio);
        }

        fn handle_fixed_ratio_unset(&mut self) {
            self.0.borrow_mut().ratio = None;
        }

        fn handle_crop_view_did_become_resettable(&mut self) {
            self.0.borrow_mut().resettable = true;
        }

        fn handle_crop_view_did_become_unresettable(&mut self) {
            self.0.borrow_mut().resettable = false;
        }

        fn set_fixed_ratio_button_visible(&mut self, visible: bool) {
            self.0.borrow_mut().ratio_button = Some(visible);
        }
    }

    fn test_image() -> SourceImage {
        SourceImage::new(RasterImage::transparent(400, 300))
    }

    fn test_config() -> Config {
        Config {
            crop_view: CropViewConfig {
                padding: 0.0,
                show_rotation_dial: false,
                ..CropViewConfig::default()
            },
            ..Config::default()
        }
    }

    fn test_controller(
        config: Config,
    ) -> (
        CropViewController,
        Rc<RefCell<RecordingDelegate>>,
        Rc<RefCell<ToolbarState>>,
    ) {
        let toolbar = Rc::new(RefCell::new(ToolbarState::default()));
        let mut controller = CropViewController::new(test_image(), config)
            .with_toolbar(Box::new(SharedToolbar(toolbar.clone())));
        let delegate = Rc::new(RefCell::new(RecordingDelegate::default()));
        controller.set_delegate(&delegate);

        controller.view_did_load();
        controller.view_did_layout(Size::new(400.0, 300.0), LayoutOrientation::Portrait);
        controller.view_did_appear();
        (controller, delegate, toolbar)
    }

    #[test]
    fn test_sync_crop_reaches_delegate() {
        let (mut controller, delegate, _) = test_controller(test_config());
        controller.crop();
        assert_eq!(delegate.borrow().cropped, [(400, 300)]);
    }

    #[test]
    fn test_async_crop_delivers_once() {
        let mut config = test_config();
        config.crop_mode = CropMode::Async;
        let (mut controller, delegate, _) = test_controller(config);

        controller.crop();
        assert!(controller.is_cropping());
        // Overlapping request is dropped
        controller.crop();
        controller.wait_for_crop();

        assert!(!controller.is_cropping());
        assert!(!controller.poll());
        assert_eq!(delegate.borrow().cropped.len(), 1);
    }

    #[test]
    fn test_failed_crop_reports_failure() {
        let (mut controller, delegate, _) = test_controller(test_config());
        let mut empty = CropViewController::new(
            SourceImage::new(RasterImage::transparent(0, 0)),
            test_config(),
        );
        empty.set_delegate(&delegate);
        empty.view_did_load();
        empty.view_did_layout(Size::new(400.0, 300.0), LayoutOrientation::Portrait);
        empty.crop();
        assert_eq!(delegate.borrow().failures, 1);

        controller.cancel();
        assert_eq!(delegate.borrow().cancels, 1);
    }

    #[test]
    fn test_dropped_delegate_is_not_called() {
        let (mut controller, delegate, _) = test_controller(test_config());
        drop(delegate);
        controller.crop();
        controller.cancel();
    }

    #[test]
    fn test_busy_delegate_is_skipped() {
        let (mut controller, delegate, _) = test_controller(test_config());
        {
            let _held = delegate.borrow_mut();
            controller.cancel();
        }
        assert_eq!(delegate.borrow().cancels, 0);

        controller.cancel();
        assert_eq!(delegate.borrow().cancels, 1);
    }

    #[test]
    fn test_circle_forces_square_ratio() {
        let mut config = test_config();
        config.crop_view.crop_shape = CropShapeType::Circle { mask_only: false };
        let (controller, _, toolbar) = test_controller(config);

        assert!(controller.config().is_always_using_one_ratio());
        assert_eq!(toolbar.borrow().ratio_button, Some(false));
        assert_eq!(toolbar.borrow().ratio, Some(1.0));
        let frame = controller.crop_view().crop_box_frame();
        assert!((frame.width - frame.height).abs() < 1e-6);
    }

    #[test]
    fn test_default_ratio_is_locked_at_start() {
        let mut config = test_config();
        config.preset_fixed_ratio = PresetFixedRatio::CanUseMultiple { default_ratio: 2.0 };
        let (controller, _, toolbar) = test_controller(config);

        assert!(controller.crop_view().aspect_ratio_lock_enabled());
        assert_eq!(toolbar.borrow().ratio_button, Some(true));
        let frame = controller.crop_view().crop_box_frame();
        assert!((frame.width / frame.height - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_handle_set_ratio_toggles() {
        let (mut controller, _, toolbar) = test_controller(test_config());

        let RatioRequest::Choose(manager) = controller.handle_set_ratio() else {
            panic!("expected a ratio list");
        };
        assert_eq!(manager.ratio_type(), RatioType::Horizontal);

        controller.set_fixed_ratio(manager.ratio_values()[1], false);
        assert_eq!(toolbar.borrow().ratio, Some(1.0));

        assert_eq!(controller.handle_set_ratio(), RatioRequest::Unlocked);
        assert_eq!(toolbar.borrow().ratio, None);
        assert!(!controller.crop_view().aspect_ratio_lock_enabled());
    }

    #[test]
    fn test_handle_set_ratio_single_entry_applies() {
        let mut config = test_config();
        config.ratio_options = RatioOptions {
            original: false,
            square: true,
            extra_default_ratios: false,
        };
        let (mut controller, _, _) = test_controller(config);
        assert_eq!(controller.handle_set_ratio(), RatioRequest::Applied(1.0));
        assert!(controller.crop_view().aspect_ratio_lock_enabled());
    }

    #[test]
    fn test_handle_set_ratio_without_presets() {
        let mut config = test_config();
        config.ratio_options = RatioOptions {
            original: false,
            square: false,
            extra_default_ratios: false,
        };
        let (mut controller, _, _) = test_controller(config);
        assert_eq!(controller.handle_set_ratio(), RatioRequest::NoRatios);
    }

    #[test]
    fn test_rotation_flips_ratio_orientation() {
        let (mut controller, _, _) = test_controller(test_config());
        controller.rotate(RotateDirection::Clockwise);
        assert_eq!(
            controller.fixed_ratio_manager().ratio_type(),
            RatioType::Vertical
        );
        let size = controller.expected_crop_image_size();
        assert!(size.approx_eq(Size::new(300.0, 400.0), 1e-6));
    }

    #[test]
    fn test_rotate_ignored_mid_rotation() {
        let (mut controller, _, _) = test_controller(test_config());
        controller.crop_view.prepare_for_device_rotation();
        controller.rotate(RotateDirection::Clockwise);
        assert!(controller.crop_view().view_model().is_up_or_upside_down());
    }

    #[test]
    fn test_reset_updates_toolbar() {
        let (mut controller, _, toolbar) = test_controller(test_config());
        controller.set_fixed_ratio(1.0, true);
        assert!(toolbar.borrow().resettable);

        controller.reset();
        assert!(!toolbar.borrow().resettable);
        assert_eq!(toolbar.borrow().ratio, None);
    }

    #[test]
    fn test_touch_drag_reports_resize() {
        let (mut controller, delegate, _) = test_controller(test_config());
        assert_eq!(
            controller.touch_began(Point::new(398.0, 150.0)),
            TouchTarget::CropBox
        );
        controller.touch_moved(Point::new(298.0, 150.0));
        controller.touch_ended();

        let delegate = delegate.borrow();
        assert_eq!(delegate.began, 1);
        assert_eq!(delegate.ended.len(), 1);
        assert!(delegate.frames.len() >= 2);
    }

    #[test]
    fn test_view_will_transition_keeps_crop() {
        let (mut controller, _, _) = test_controller(test_config());
        controller.set_fixed_ratio(1.0, true);
        let frame = controller.crop_view().crop_box_frame();

        controller.view_will_transition(Size::new(400.0, 300.0), LayoutOrientation::Portrait);
        assert_eq!(controller.crop_view().crop_box_frame(), frame);

        controller.view_will_transition(Size::new(300.0, 400.0), LayoutOrientation::Portrait);
        let frame = controller.crop_view().crop_box_frame();
        assert!((frame.width - frame.height).abs() < 1e-6);
    }

    #[test]
    fn test_process_other_image() {
        let (controller, _, _) = test_controller(test_config());
        let other = SourceImage::new(RasterImage::transparent(80, 60));
        let image = controller.process(&other).unwrap();
        assert_eq!((image.width, image.height), (80, 60));
    }
}
