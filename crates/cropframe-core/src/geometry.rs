//! Plane geometry shared by the crop box, the viewport and the rasterizer.
//!
//! All coordinates are `f64` in a y-down screen space: the origin is the
//! top-left corner and positive angles rotate clockwise on screen.
//!
//! # Affine transforms
//!
//! [`Affine`] follows the usual 2x3 convention:
//!
//! ```text
//! x' = a * x + c * y + tx
//! y' = b * x + d * y + ty
//! ```
//!
//! The builder methods [`Affine::translated`], [`Affine::rotated`] and
//! [`Affine::scaled`] prepend their operation, so
//! `Affine::translation(t).rotated(r).scaled(sx, sy)` maps a point by scaling
//! first, then rotating, then translating.

use serde::{Deserialize, Serialize};

/// A point (or vector) in view space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise comparison with an absolute tolerance.
    pub fn approx_eq(self, other: Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero or negative.
    pub fn is_empty(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Width and height exchanged.
    pub fn swapped(self) -> Size {
        Size::new(self.height, self.width)
    }

    pub fn scaled(self, factor: f64) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }

    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn approx_eq(self, other: Size, tolerance: f64) -> bool {
        (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

/// An axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size anchored at the origin.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Rectangle of the given size whose center is `center`.
    pub fn centered_at(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    /// Smallest rectangle spanning two corner points, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn mid_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn center(&self) -> Point {
        Point::new(self.mid_x(), self.mid_y())
    }

    /// The four corners, clockwise from top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x(), self.min_y()),
            Point::new(self.max_x(), self.min_y()),
            Point::new(self.max_x(), self.max_y()),
            Point::new(self.min_x(), self.max_y()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Half-open containment: the max edges are outside.
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x < self.max_x()
            && point.y >= self.min_y()
            && point.y < self.max_y()
    }

    /// True when `other` lies entirely inside `self` (edges may touch).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.min_x() >= self.min_x()
            && other.min_y() >= self.min_y()
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    /// Shrink (positive) or grow (negative) every edge.
    pub fn inset_by(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(
            self.x + dx,
            self.y + dy,
            self.width - 2.0 * dx,
            self.height - 2.0 * dy,
        )
    }

    pub fn offset_by(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Overlapping region, or `None` when the rectangles are disjoint.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.min_x().max(other.min_x());
        let y0 = self.min_y().max(other.min_y());
        let x1 = self.max_x().min(other.max_x());
        let y1 = self.max_y().min(other.max_y());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn approx_eq(&self, other: &Rect, tolerance: f64) -> bool {
        self.origin().approx_eq(other.origin(), tolerance)
            && self.size().approx_eq(other.size(), tolerance)
    }
}

/// A 2D affine transform (see the module docs for the layout).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn translation(tx: f64, ty: f64) -> Self {
        Affine {
            tx,
            ty,
            ..Self::IDENTITY
        }
    }

    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Affine {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// `self ∘ other`: apply `other` first, then `self`.
    pub fn concat(&self, other: &Affine) -> Affine {
        Affine {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    pub fn translated(&self, tx: f64, ty: f64) -> Affine {
        self.concat(&Affine::translation(tx, ty))
    }

    pub fn rotated(&self, radians: f64) -> Affine {
        self.concat(&Affine::rotation(radians))
    }

    pub fn scaled(&self, sx: f64, sy: f64) -> Affine {
        self.concat(&Affine::scale(sx, sy))
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Affine> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON || !det.is_finite() {
            return None;
        }
        let a = self.d / det;
        let b = -self.b / det;
        let c = -self.c / det;
        let d = self.a / det;
        Some(Affine {
            a,
            b,
            c,
            d,
            tx: -(a * self.tx + c * self.ty),
            ty: -(b * self.tx + d * self.ty),
        })
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Apply only the linear part (no translation).
    pub fn apply_vector(&self, v: Point) -> Point {
        Point::new(self.a * v.x + self.c * v.y, self.b * v.x + self.d * v.y)
    }

    /// The same transform without its translation.
    pub fn linear(&self) -> Affine {
        Affine {
            tx: 0.0,
            ty: 0.0,
            ..*self
        }
    }

    pub fn approx_eq(&self, other: &Affine, tolerance: f64) -> bool {
        [
            self.a - other.a,
            self.b - other.b,
            self.c - other.c,
            self.d - other.d,
            self.tx - other.tx,
            self.ty - other.ty,
        ]
        .iter()
        .all(|delta| delta.abs() <= tolerance)
    }
}

/// Largest rectangle with `inner`'s aspect ratio that fits centered in `outer`.
///
/// # Arguments
///
/// * `outer` - The bounding rectangle
/// * `inner` - Only its width/height ratio is used
///
/// # Returns
///
/// A rectangle centered in `outer` that touches `outer` on at least one
/// axis. Degenerate input (non-positive `outer` dimensions or an empty
/// `inner`) yields [`Rect::ZERO`].
pub fn inscribe(outer: Rect, inner: Rect) -> Rect {
    if outer.is_empty() || inner.is_empty() {
        return Rect::ZERO;
    }

    let outer_ratio = outer.width / outer.height;
    let inner_ratio = inner.width / inner.height;

    let size = if outer_ratio > inner_ratio {
        Size::new(outer.height * inner_ratio, outer.height)
    } else {
        Size::new(outer.width, outer.width / inner_ratio)
    };

    Rect::centered_at(outer.center(), size)
}

/// Axis-aligned bounding size of a `size` rectangle rotated by `radians`.
///
/// ```text
/// width'  = |cos θ|·w + |sin θ|·h
/// height' = |sin θ|·w + |cos θ|·h
/// ```
pub fn rotated_bounding_size(size: Size, radians: f64) -> Size {
    let (sin, cos) = radians.sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    Size::new(
        cos * size.width + sin * size.height,
        sin * size.width + cos * size.height,
    )
}

/// Bounding rectangle of `rect` after mapping each corner through `transform`.
pub fn transformed_bounds(rect: &Rect, transform: &Affine) -> Rect {
    let corners = rect.corners().map(|p| transform.apply(p));
    let mut min = corners[0];
    let mut max = corners[0];
    for p in &corners[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Rect::from_corners(min, max)
}

/// Wrap an angle into `[-π, π]`.
pub fn normalize_radians(radians: f64) -> f64 {
    if !radians.is_finite() {
        return 0.0;
    }
    let tau = std::f64::consts::TAU;
    let mut r = radians % tau;
    if r > std::f64::consts::PI {
        r -= tau;
    } else if r < -std::f64::consts::PI {
        r += tau;
    }
    r
}

/// Points of a regular polygon on a circle, starting at `offset_degrees`
/// measured counter-clockwise from the positive x axis.
pub fn polygon_points(
    sides: u32,
    center: Point,
    radius: f64,
    offset_degrees: f64,
) -> Vec<Point> {
    if sides < 3 {
        return Vec::new();
    }
    let step = std::f64::consts::TAU / sides as f64;
    let offset = offset_degrees.to_radians();
    (0..sides)
        .map(|i| {
            let angle = step * i as f64 - offset;
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}


// =============================================================================
// Property-Based Tests
// =============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (
            -500.0f64..500.0,
            -500.0f64..500.0,
            1.0f64..2000.0,
            1.0f64..2000.0,
        )
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_inscribe_centered_fitting_and_ratio(
            outer in rect_strategy(),
            ratio in 0.05f64..20.0,
        ) {
            let inner = Rect::new(0.0, 0.0, ratio * 100.0, 100.0);
            let result = inscribe(outer, inner);
            let tol = 1e-6 * outer.width.max(outer.height);

            prop_assert!(result.center().approx_eq(outer.center(), tol));
            prop_assert!(result.width <= outer.width + tol);
            prop_assert!(result.height <= outer.height + tol);
            prop_assert!((result.width / result.height - ratio).abs() <= 1e-6 * ratio);
            prop_assert!(
                (result.width - outer.width).abs() <= tol
                    || (result.height - outer.height).abs() <= tol
            );
        }

        #[test]
        fn prop_rotated_bounds_contain_original_area(
            w in 1.0f64..1000.0,
            h in 1.0f64..1000.0,
            radians in -3.2f64..3.2,
        ) {
            let bounds = rotated_bounding_size(Size::new(w, h), radians);
            prop_assert!(bounds.width * bounds.height >= w * h * (1.0 - 1e-9));
        }

        #[test]
        fn prop_normalize_radians_in_range(radians in -100.0f64..100.0) {
            let r = normalize_radians(radians);
            prop_assert!(r >= -std::f64::consts::PI - 1e-12);
            prop_assert!(r <= std::f64::consts::PI + 1e-12);
            prop_assert!(((r - radians) / std::f64::consts::TAU).fract().abs() < 1e-9
                || (1.0 - ((r - radians) / std::f64::consts::TAU).fract().abs()) < 1e-9);
        }
    }
}
