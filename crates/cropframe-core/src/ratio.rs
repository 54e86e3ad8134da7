//! Fixed aspect-ratio presets offered to the user.
//!
//! Each preset carries both orientations, e.g. `3:2` / `2:3`. Which one is
//! shown depends on [`RatioType`], derived from the image orientation and
//! the current quarter-turn rotation.

use serde::{Deserialize, Serialize};

use crate::view_model::RatioType;

/// Extra presets, as horizontal width:height.
const EXTRA_DEFAULT_RATIOS: [(u32, u32); 6] = [(3, 2), (5, 3), (4, 3), (5, 4), (7, 5), (16, 9)];

/// A preset in both orientations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioItem {
    pub name_h: String,
    pub ratio_h: f64,
    pub name_v: String,
    pub ratio_v: f64,
}

impl RatioItem {
    /// Preset for a horizontal `width:height` ratio and its vertical twin.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        Self {
            name_h: format!("{width}:{height}"),
            ratio_h: width as f64 / height as f64,
            name_v: format!("{height}:{width}"),
            ratio_v: height as f64 / width as f64,
        }
    }

    pub fn ratio(&self, ratio_type: RatioType) -> f64 {
        match ratio_type {
            RatioType::Horizontal => self.ratio_h,
            RatioType::Vertical => self.ratio_v,
        }
    }

    pub fn name(&self, ratio_type: RatioType) -> &str {
        match ratio_type {
            RatioType::Horizontal => &self.name_h,
            RatioType::Vertical => &self.name_v,
        }
    }
}

/// Which built-in presets are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RatioOptions {
    pub original: bool,
    pub square: bool,
    pub extra_default_ratios: bool,
}

impl Default for RatioOptions {
    fn default() -> Self {
        Self {
            original: true,
            square: true,
            extra_default_ratios: true,
        }
    }
}

/// The preset list for one image in one orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedRatioManager {
    ratio_type: RatioType,
    original_ratio_h: f64,
    ratios: Vec<RatioItem>,
}

impl FixedRatioManager {
    /// Build the preset list.
    ///
    /// Order: "Original" and "1:1" (when enabled), followed by the extra and
    /// custom presets sorted ascending by their ratio in `ratio_type`.
    /// Presets with a ratio already present are dropped.
    ///
    /// # Arguments
    ///
    /// * `ratio_type` - Orientation the list is shown in
    /// * `original_ratio_h` - Displayed image width / height
    /// * `options` - Built-in presets to include
    /// * `custom_ratios` - Caller-supplied presets
    pub fn new(
        ratio_type: RatioType,
        original_ratio_h: f64,
        options: RatioOptions,
        custom_ratios: &[RatioItem],
    ) -> Self {
        let mut manager = Self {
            ratio_type,
            original_ratio_h,
            ratios: Vec::new(),
        };

        if options.original {
            manager.append(RatioItem {
                name_h: "Original".to_string(),
                ratio_h: original_ratio_h,
                name_v: "Original".to_string(),
                ratio_v: original_ratio_h,
            });
        }
        if options.square {
            manager.append(RatioItem::from_dimensions(1, 1));
        }
        let leading = manager.ratios.len();

        if options.extra_default_ratios {
            for (w, h) in EXTRA_DEFAULT_RATIOS {
                manager.append(RatioItem::from_dimensions(w, h));
            }
        }
        for item in custom_ratios {
            manager.append(item.clone());
        }

        manager.ratios[leading..].sort_by(|a, b| a.ratio(ratio_type).total_cmp(&b.ratio(ratio_type)));
        manager
    }

    fn append(&mut self, item: RatioItem) {
        let duplicate = self
            .ratios
            .iter()
            .any(|existing| (existing.ratio_h - item.ratio_h).abs() < 1e-9);
        if !duplicate && item.ratio_h.is_finite() && item.ratio_h > 0.0 {
            self.ratios.push(item);
        }
    }

    pub fn ratio_type(&self) -> RatioType {
        self.ratio_type
    }

    pub fn original_ratio_h(&self) -> f64 {
        self.original_ratio_h
    }

    pub fn ratios(&self) -> &[RatioItem] {
        &self.ratios
    }

    /// Ratio values in the current orientation.
    pub fn ratio_values(&self) -> Vec<f64> {
        self.ratios.iter().map(|r| r.ratio(self.ratio_type)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order_horizontal() {
        let manager =
            FixedRatioManager::new(RatioType::Horizontal, 1.5, RatioOptions::default(), &[]);
        let names: Vec<&str> = manager
            .ratios()
            .iter()
            .map(|r| r.name(RatioType::Horizontal))
            .collect();
        // 3:2 equals the original ratio and is dropped
        assert_eq!(names, ["Original", "1:1", "5:4", "4:3", "7:5", "5:3", "16:9"]);
    }

    #[test]
    fn test_vertical_sorts_by_vertical_ratio() {
        let manager =
            FixedRatioManager::new(RatioType::Vertical, 0.75, RatioOptions::default(), &[]);
        let values = manager.ratio_values();
        assert_eq!(values[0], 0.75);
        assert_eq!(values[1], 1.0);
        assert!(values[2..].windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(manager.ratios()[2].name_v, "9:16");
    }

    #[test]
    fn test_custom_ratios_are_merged() {
        let custom = [RatioItem::from_dimensions(2, 1), RatioItem::from_dimensions(4, 3)];
        let options = RatioOptions {
            extra_default_ratios: false,
            ..RatioOptions::default()
        };
        let manager = FixedRatioManager::new(RatioType::Horizontal, 1.0, options, &custom);
        let values = manager.ratio_values();
        // Original equals 1:1 here, so only one of them is kept
        assert_eq!(values, [1.0, 4.0 / 3.0, 2.0]);
    }

    #[test]
    fn test_no_options_no_ratios() {
        let options = RatioOptions {
            original: false,
            square: false,
            extra_default_ratios: false,
        };
        let manager = FixedRatioManager::new(RatioType::Horizontal, 1.5, options, &[]);
        assert!(manager.ratios().is_empty());
    }

    #[test]
    fn test_ratio_item_twins() {
        let item = RatioItem::from_dimensions(16, 9);
        assert_eq!(item.name_v, "9:16");
        assert!((item.ratio_h * item.ratio_v - 1.0).abs() < 1e-12);
    }
}
