//! Crop box edges and edge hit testing.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Which part of the crop box a touch grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CropBoxEdge {
    /// No edge: the whole box moves.
    #[default]
    None,
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl CropBoxEdge {
    pub fn moves_left(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, Self::Right | Self::TopRight | Self::BottomRight)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::Bottom | Self::BottomLeft | Self::BottomRight)
    }

    /// Corners resize along both axes at once.
    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Self::TopLeft | Self::TopRight | Self::BottomLeft | Self::BottomRight
        )
    }
}

/// Find the edge of `touch_rect` under `point`.
///
/// `touch_rect` is the crop box grown by half a hot-area unit on every side,
/// so each hit band straddles the box boundary. Corners win over edges.
///
/// # Arguments
///
/// * `point` - Touch location in view coordinates
/// * `touch_rect` - Crop box inset by `-hot_area_unit / 2`
/// * `hot_area_unit` - Width of a hit band
pub fn crop_edge(point: Point, touch_rect: Rect, hot_area_unit: f64) -> CropBoxEdge {
    let unit = hot_area_unit;
    let (min_x, min_y) = (touch_rect.min_x(), touch_rect.min_y());
    let (max_x, max_y) = (touch_rect.max_x(), touch_rect.max_y());

    let top_left = Rect::new(min_x, min_y, unit, unit);
    let top_right = Rect::new(max_x - unit, min_y, unit, unit);
    let bottom_left = Rect::new(min_x, max_y - unit, unit, unit);
    let bottom_right = Rect::new(max_x - unit, max_y - unit, unit, unit);

    if top_left.contains_point(point) {
        return CropBoxEdge::TopLeft;
    }
    if top_right.contains_point(point) {
        return CropBoxEdge::TopRight;
    }
    if bottom_left.contains_point(point) {
        return CropBoxEdge::BottomLeft;
    }
    if bottom_right.contains_point(point) {
        return CropBoxEdge::BottomRight;
    }

    let top = Rect::new(min_x, min_y, touch_rect.width, unit);
    let left = Rect::new(min_x, min_y, unit, touch_rect.height);
    let right = Rect::new(max_x - unit, min_y, unit, touch_rect.height);
    let bottom = Rect::new(min_x, max_y - unit, touch_rect.width, unit);

    if top.contains_point(point) {
        CropBoxEdge::Top
    } else if left.contains_point(point) {
        CropBoxEdge::Left
    } else if right.contains_point(point) {
        CropBoxEdge::Right
    } else if bottom.contains_point(point) {
        CropBoxEdge::Bottom
    } else {
        CropBoxEdge::None
    }
}
