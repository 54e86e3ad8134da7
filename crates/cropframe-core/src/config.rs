//! Editor configuration.
//!
//! [`Config`] configures the controller; [`CropViewConfig`] the view it
//! drives. Both round-trip through JSON so hosts can ship them as plain
//! objects.
//!
//! # Examples
//!
//! ```ignore
//! use cropframe_core::config::Config;
//!
//! let config = Config::from_json(r#"{"cropView": {"cropShape": {"type": "square"}}}"#)?;
//! assert_eq!(config.crop_view.padding, 14.0);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Rect;
use crate::mask::{CropBorder, CropShapeType};
use crate::ratio::{RatioItem, RatioOptions};
use crate::transform::Transformation;

/// Errors from configuration parsing and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value that must be strictly positive is not.
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    /// A value that must not be negative is.
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// The zoom range is empty.
    #[error("Invalid zoom range: min {min} > max {max}")]
    InvalidZoomRange { min: f64, max: f64 },

    /// A custom ratio has a zero term.
    #[error("Invalid custom ratio {width}:{height}")]
    InvalidCustomRatio { width: u32, height: u32 },

    /// JSON could not be parsed or produced.
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Background behind the crop box outside of gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CropMaskVisualEffect {
    #[default]
    DarkBlur,
    LightBlur,
    /// Plain dimming, the same as during gestures.
    None,
}

/// Crop state to restore when the editor opens.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PresetTransformation {
    #[default]
    None,
    /// A snapshot returned by an earlier crop.
    Transformation { transformation: Transformation },
    /// Crop region as a fraction of the initial crop box.
    NormalizedRect { rect: Rect },
}

/// View-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropViewConfig {
    /// Space kept free around the crop box.
    pub padding: f64,
    /// Width of the edge hit band.
    pub hot_area_unit: f64,
    pub min_crop_box_size: f64,
    pub min_zoom_scale: f64,
    pub max_zoom_scale: f64,
    pub show_rotation_dial: bool,
    pub rotation_dial_height: f64,
    pub border: CropBorder,
    pub crop_shape: CropShapeType,
    pub mask_visual_effect: CropMaskVisualEffect,
    pub preset_transformation: PresetTransformation,
}

impl Default for CropViewConfig {
    fn default() -> Self {
        Self {
            padding: 14.0,
            hot_area_unit: 32.0,
            min_crop_box_size: 42.0,
            min_zoom_scale: 1.0,
            max_zoom_scale: 15.0,
            show_rotation_dial: true,
            rotation_dial_height: 60.0,
            border: CropBorder::default(),
            crop_shape: CropShapeType::Rect,
            mask_visual_effect: CropMaskVisualEffect::DarkBlur,
            preset_transformation: PresetTransformation::None,
        }
    }
}

impl CropViewConfig {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Check numeric settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("hotAreaUnit", self.hot_area_unit)?;
        positive("minCropBoxSize", self.min_crop_box_size)?;
        positive("minZoomScale", self.min_zoom_scale)?;
        positive("maxZoomScale", self.max_zoom_scale)?;
        non_negative("padding", self.padding)?;
        non_negative("rotationDialHeight", self.rotation_dial_height)?;
        non_negative("border.width", self.border.width)?;
        if self.min_zoom_scale > self.max_zoom_scale {
            return Err(ConfigError::InvalidZoomRange {
                min: self.min_zoom_scale,
                max: self.max_zoom_scale,
            });
        }
        Ok(())
    }
}

/// Whether the crop runs inline or on a background thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CropMode {
    #[default]
    Sync,
    Async,
}

/// How preset ratios are applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PresetFixedRatio {
    /// The user may pick any ratio; `default_ratio > 0` is locked at start.
    #[serde(rename_all = "camelCase")]
    CanUseMultiple { default_ratio: f64 },
    /// One ratio, always locked; the ratio button is hidden.
    AlwaysUsingOne { ratio: f64 },
}

impl Default for PresetFixedRatio {
    fn default() -> Self {
        Self::CanUseMultiple { default_ratio: 0.0 }
    }
}

/// Orientation of the ratio list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FixedRatiosShowType {
    /// Follow the displayed image orientation.
    #[default]
    Adaptive,
    Horizontal,
    Vertical,
}

/// A caller-supplied `width:height` preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRatio {
    pub width: u32,
    pub height: u32,
}

/// Controller-level settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub crop_view: CropViewConfig,
    pub crop_mode: CropMode,
    pub preset_fixed_ratio: PresetFixedRatio,
    pub ratio_options: RatioOptions,
    pub custom_ratios: Vec<CustomRatio>,
    pub fixed_ratios_show_type: FixedRatiosShowType,
}

impl Config {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.crop_view.validate()?;
        for ratio in &self.custom_ratios {
            if ratio.width == 0 || ratio.height == 0 {
                return Err(ConfigError::InvalidCustomRatio {
                    width: ratio.width,
                    height: ratio.height,
                });
            }
        }
        match self.preset_fixed_ratio {
            PresetFixedRatio::CanUseMultiple { default_ratio } => {
                non_negative("presetFixedRatio.defaultRatio", default_ratio)
            }
            PresetFixedRatio::AlwaysUsingOne { ratio } => {
                positive("presetFixedRatio.ratio", ratio)
            }
        }
    }

    pub fn custom_ratio_items(&self) -> Vec<RatioItem> {
        self.custom_ratios
            .iter()
            .map(|r| RatioItem::from_dimensions(r.width, r.height))
            .collect()
    }

    pub fn is_always_using_one_ratio(&self) -> bool {
        matches!(
            self.preset_fixed_ratio,
            PresetFixedRatio::AlwaysUsingOne { .. }
        )
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
