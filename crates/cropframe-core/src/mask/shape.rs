//! Crop shape configuration.

use serde::{Deserialize, Serialize};

use crate::geometry::{polygon_points, Point};

/// Shape of the crop region.
///
/// Every shape except [`CropShapeType::Rect`] and [`CropShapeType::Square`]
/// clips the cropped image to its outline. With `mask_only` set the shape is
/// only drawn over the editor and the output stays rectangular.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CropShapeType {
    #[default]
    Rect,
    Square,
    #[serde(rename_all = "camelCase")]
    Ellipse { mask_only: bool },
    #[serde(rename_all = "camelCase")]
    Circle { mask_only: bool },
    /// Corner radius is `radius_to_short_side` times the shorter image side.
    #[serde(rename_all = "camelCase")]
    RoundedRect {
        radius_to_short_side: f64,
        mask_only: bool,
    },
    #[serde(rename_all = "camelCase")]
    Diamond { mask_only: bool },
    #[serde(rename_all = "camelCase")]
    Heart { mask_only: bool },
    /// Regular polygon; `offset` rotates it in degrees.
    #[serde(rename_all = "camelCase")]
    Polygon {
        sides: u32,
        offset: f64,
        mask_only: bool,
    },
    /// Closed path through points in the unit square.
    #[serde(rename_all = "camelCase")]
    Path { points: Vec<Point>, mask_only: bool },
}

/// What the output image is clipped to.
#[derive(Debug, Clone, PartialEq)]
pub enum MaskOutline {
    /// No clipping; a border, if any, frames the rectangle.
    Unmasked,
    Oval,
    RoundedRect { radius_to_short_side: f64 },
    Heart,
    /// Closed polygon in unit-square coordinates.
    Polygon(Vec<Point>),
}

impl CropShapeType {
    pub fn is_mask_only(&self) -> bool {
        match self {
            Self::Rect | Self::Square => true,
            Self::Ellipse { mask_only }
            | Self::Circle { mask_only }
            | Self::RoundedRect { mask_only, .. }
            | Self::Diamond { mask_only }
            | Self::Heart { mask_only }
            | Self::Polygon { mask_only, .. }
            | Self::Path { mask_only, .. } => *mask_only,
        }
    }

    /// Aspect ratio the shape requires, if any.
    pub fn forced_ratio(&self) -> Option<f64> {
        match self {
            Self::Square | Self::Circle { .. } | Self::Heart { .. } => Some(1.0),
            _ => None,
        }
    }

    /// True for shapes drawn as an oval over the editor.
    pub fn is_oval(&self) -> bool {
        matches!(self, Self::Ellipse { .. } | Self::Circle { .. })
    }

    /// Outline the cropped image is clipped to.
    pub fn outline(&self) -> MaskOutline {
        if self.is_mask_only() {
            return MaskOutline::Unmasked;
        }
        match self {
            Self::Ellipse { .. } | Self::Circle { .. } => MaskOutline::Oval,
            Self::RoundedRect {
                radius_to_short_side,
                ..
            } => MaskOutline::RoundedRect {
                radius_to_short_side: *radius_to_short_side,
            },
            Self::Diamond { .. } => MaskOutline::Polygon(vec![
                Point::new(0.5, 0.0),
                Point::new(1.0, 0.5),
                Point::new(0.5, 1.0),
                Point::new(0.0, 0.5),
            ]),
            Self::Heart { .. } => MaskOutline::Heart,
            Self::Polygon { sides, offset, .. } => MaskOutline::Polygon(polygon_points(
                *sides,
                Point::new(0.5, 0.5),
                0.5,
                90.0 + offset,
            )),
            Self::Path { points, .. } => MaskOutline::Polygon(points.clone()),
            Self::Rect | Self::Square => MaskOutline::Unmasked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_ratio_shapes() {
        assert_eq!(CropShapeType::Square.forced_ratio(), Some(1.0));
        assert_eq!(
            CropShapeType::Circle { mask_only: true }.forced_ratio(),
            Some(1.0)
        );
        assert_eq!(
            CropShapeType::Heart { mask_only: false }.forced_ratio(),
            Some(1.0)
        );
        assert_eq!(
            CropShapeType::Ellipse { mask_only: false }.forced_ratio(),
            None
        );
        assert_eq!(CropShapeType::Rect.forced_ratio(), None);
    }

    #[test]
    fn test_mask_only_is_unmasked() {
        let shape = CropShapeType::Polygon {
            sides: 6,
            offset: 0.0,
            mask_only: true,
        };
        assert_eq!(shape.outline(), MaskOutline::Unmasked);
        assert_eq!(CropShapeType::Square.outline(), MaskOutline::Unmasked);
    }

    #[test]
    fn test_polygon_starts_at_top() {
        let shape = CropShapeType::Polygon {
            sides: 4,
            offset: 0.0,
            mask_only: false,
        };
        let MaskOutline::Polygon(points) = shape.outline() else {
            panic!("expected polygon outline");
        };
        assert_eq!(points.len(), 4);
        assert!(points[0].approx_eq(Point::new(0.5, 0.0), 1e-9));
    }

    #[test]
    fn test_serde_tagged_shape() {
        let shape = CropShapeType::RoundedRect {
            radius_to_short_side: 0.1,
            mask_only: false,
        };
        let json = serde_json::to_string(&shape).unwrap();
        assert!(json.contains("\"type\":\"roundedRect\""));
        assert!(json.contains("radiusToShortSide"));
        let restored: CropShapeType = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, shape);
    }
}
