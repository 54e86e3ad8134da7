//! Cropframe Core - Interactive image cropping
//!
//! This crate holds everything of the crop editor that is independent of a
//! UI toolkit: the crop box and rotation state machine, the viewport
//! mapping the image into view space, gesture handling, preset replay and
//! the final rasterization of the crop.
//!
//! The host draws the [`crop_view::CropOverlay`] and the image using
//! [`crop_view::Viewport::container_to_view_transform`]. It feeds lifecycle
//! calls, commands and touches into a [`controller::CropViewController`].

pub mod config;
pub mod controller;
pub mod crop_view;
pub mod decode;
pub mod encode;
pub mod geometry;
pub mod mask;
pub mod ratio;
pub mod transform;
pub mod view_model;

pub use config::{Config, ConfigError, CropMode, CropViewConfig, PresetFixedRatio, PresetTransformation};
pub use controller::{CropToolbar, CropViewController, CropViewControllerDelegate, RatioRequest};
pub use crop_view::{CropOutput, CropView, CropViewEvent, LayoutOrientation, TouchTarget};
pub use decode::{decode_image, DecodeError, RasterImage, SourceImage};
pub use encode::{encode_png, EncodeError};
pub use geometry::{Affine, Point, Rect, Size};
pub use mask::{CropBorder, CropShapeType};
pub use transform::{CropError, CropInfo, Transformation};
pub use view_model::{CropViewStatus, RotateDirection};
