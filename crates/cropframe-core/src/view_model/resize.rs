//! Crop box resize math for edge and corner drags.
//!
//! Every function here returns the geometrically correct candidate frame.
//! Nothing is clamped to a minimum size; callers decide whether to accept.

use crate::geometry::{Point, Rect};

use super::CropBoxEdge;

/// Candidate frame for a drag that started on `edge` of `origin`.
///
/// # Arguments
///
/// * `origin` - Crop box frame when the drag began
/// * `edge` - Edge or corner grabbed at drag start
/// * `delta` - Touch displacement since drag start
/// * `content` - Area the box may occupy
/// * `locked_ratio` - Width/height to preserve, or `None` for free resizing
pub fn resized_frame(
    origin: Rect,
    edge: CropBoxEdge,
    delta: Point,
    content: Rect,
    locked_ratio: Option<f64>,
) -> Rect {
    match (edge, locked_ratio) {
        (CropBoxEdge::None, _) => moved_frame(origin, delta, content),
        (_, None) => free_frame(origin, edge, delta, content),
        (_, Some(ratio)) => locked_frame(origin, edge, delta, ratio),
    }
}

/// Translate the whole box, keeping it inside `content` when it fits.
fn moved_frame(origin: Rect, delta: Point, content: Rect) -> Rect {
    let clamp = |value: f64, min: f64, max: f64| value.min(max).max(min);
    let x = clamp(
        origin.x + delta.x,
        content.min_x(),
        content.max_x() - origin.width,
    );
    let y = clamp(
        origin.y + delta.y,
        content.min_y(),
        content.max_y() - origin.height,
    );
    Rect::new(x, y, origin.width, origin.height)
}

/// Move the grabbed edges independently; the opposite edges stay put.
fn free_frame(origin: Rect, edge: CropBoxEdge, delta: Point, content: Rect) -> Rect {
    let mut frame = origin;

    if edge.moves_left() {
        frame.x = origin.x + delta.x;
        frame.width = origin.width - delta.x;
    } else if edge.moves_right() {
        frame.width = (origin.width + delta.x).min(content.max_x() - origin.min_x());
    }

    if edge.moves_top() {
        frame.y = origin.y + delta.y;
        frame.height = origin.height - delta.y;
    } else if edge.moves_bottom() {
        frame.height = (origin.height + delta.y).min(content.max_y() - origin.min_y());
    }

    frame
}

/// Resize while keeping `ratio`, anchored at the opposite edge or corner.
fn locked_frame(origin: Rect, edge: CropBoxEdge, delta: Point, ratio: f64) -> Rect {
    if !ratio.is_finite() || ratio <= 0.0 || origin.is_empty() {
        return origin;
    }

    if edge.is_corner() {
        let sx = if edge.moves_left() {
            1.0 - delta.x / origin.width
        } else {
            1.0 + delta.x / origin.width
        };
        let sy = if edge.moves_top() {
            1.0 - delta.y / origin.height
        } else {
            1.0 + delta.y / origin.height
        };
        let scale = (sx + sy) / 2.0;
        let width = origin.width * scale;
        let height = width / ratio;

        let x = if edge.moves_left() {
            origin.max_x() - width
        } else {
            origin.min_x()
        };
        let y = if edge.moves_top() {
            origin.max_y() - height
        } else {
            origin.min_y()
        };
        return Rect::new(x, y, width, height);
    }

    match edge {
        CropBoxEdge::Left | CropBoxEdge::Right => {
            let width = if edge == CropBoxEdge::Left {
                origin.width - delta.x
            } else {
                origin.width + delta.x
            };
            let height = width / ratio;
            let x = if edge == CropBoxEdge::Left {
                origin.max_x() - width
            } else {
                origin.min_x()
            };
            Rect::new(x, origin.mid_y() - height / 2.0, width, height)
        }
        CropBoxEdge::Top | CropBoxEdge::Bottom => {
            let height = if edge == CropBoxEdge::Top {
                origin.height - delta.y
            } else {
                origin.height + delta.y
            };
            let width = height * ratio;
            let y = if edge == CropBoxEdge::Top {
                origin.max_y() - height
            } else {
                origin.min_y()
            };
            Rect::new(origin.mid_x() - width / 2.0, y, width, height)
        }
        _ => origin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn origin() -> Rect {
        Rect::new(100.0, 100.0, 200.0, 100.0)
    }

    fn content() -> Rect {
        Rect::new(0.0, 0.0, 500.0, 400.0)
    }

    #[test]
    fn test_free_left_keeps_right_edge() {
        let frame = resized_frame(origin(), CropBoxEdge::Left, Point::new(30.0, 0.0), content(), None);
        assert!(frame.approx_eq(&Rect::new(130.0, 100.0, 170.0, 100.0), EPS));
        assert!((frame.max_x() - origin().max_x()).abs() < EPS);
    }

    #[test]
    fn test_free_right_capped_by_content() {
        let frame = resized_frame(origin(), CropBoxEdge::Right, Point::new(500.0, 0.0), content(), None);
        assert!((frame.max_x() - content().max_x()).abs() < EPS);
    }

    #[test]
    fn test_free_corner_moves_both_edges() {
        let frame = resized_frame(
            origin(),
            CropBoxEdge::TopLeft,
            Point::new(-20.0, -10.0),
            content(),
            None,
        );
        assert!(frame.approx_eq(&Rect::new(80.0, 90.0, 220.0, 110.0), EPS));
    }

    #[test]
    fn test_free_result_may_be_degenerate() {
        let frame = resized_frame(origin(), CropBoxEdge::Top, Point::new(0.0, 150.0), content(), None);
        assert!(frame.height < 0.0);
    }

    #[test]
    fn test_move_clamped_to_content() {
        let frame = resized_frame(origin(), CropBoxEdge::None, Point::new(-500.0, 1000.0), content(), None);
        assert!(frame.approx_eq(&Rect::new(0.0, 300.0, 200.0, 100.0), EPS));
    }

    #[test]
    fn test_locked_right_keeps_ratio_and_center_line() {
        let frame = resized_frame(
            origin(),
            CropBoxEdge::Right,
            Point::new(40.0, 0.0),
            content(),
            Some(2.0),
        );
        assert!((frame.width - 240.0).abs() < EPS);
        assert!((frame.height - 120.0).abs() < EPS);
        assert!((frame.mid_y() - origin().mid_y()).abs() < EPS);
        assert!((frame.min_x() - origin().min_x()).abs() < EPS);
    }

    #[test]
    fn test_locked_top_anchors_bottom() {
        let frame = resized_frame(origin(), CropBoxEdge::Top, Point::new(0.0, 20.0), content(), Some(2.0));
        assert!((frame.height - 80.0).abs() < EPS);
        assert!((frame.width - 160.0).abs() < EPS);
        assert!((frame.max_y() - origin().max_y()).abs() < EPS);
    }

    #[test]
    fn test_locked_corner_anchors_opposite_corner() {
        let frame = resized_frame(
            origin(),
            CropBoxEdge::TopLeft,
            Point::new(20.0, 10.0),
            content(),
            Some(2.0),
        );
        // Opposite (bottom-right) corner is fixed
        assert!((frame.max_x() - origin().max_x()).abs() < EPS);
        assert!((frame.max_y() - origin().max_y()).abs() < EPS);
        assert!((frame.width / frame.height - 2.0).abs() < EPS);
        // Average of 0.9 and 0.9
        assert!((frame.width - 180.0).abs() < EPS);
    }
}
