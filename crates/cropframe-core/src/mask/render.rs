//! Clip a cropped image to its shape outline.
//!
//! The outline is built in the image rectangle (inset by the border width
//! when a border is set), optionally stroked, then filled into an
//! anti-aliased clip mask. The image is drawn through that mask onto a
//! transparent canvas.

use serde::{Deserialize, Serialize};
use tiny_skia::{
    ColorU8, FillRule, Mask, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

use crate::decode::RasterImage;
use crate::geometry::{Point, Rect};

use super::{CropShapeType, MaskError, MaskOutline};

/// Cubic Bézier factor for quarter circles.
const KAPPA: f32 = 0.552_284_8;

/// Segments per heart lobe.
const HEART_ARC_SEGMENTS: usize = 24;

/// Stroke drawn along the mask outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropBorder {
    /// Stroke width in output pixels; 0 disables the border.
    pub width: f64,
    /// RGBA stroke color.
    pub color: [u8; 4],
}

impl Default for CropBorder {
    fn default() -> Self {
        Self {
            width: 0.0,
            color: [0, 0, 0, 0],
        }
    }
}

impl CropBorder {
    pub fn is_visible(&self) -> bool {
        self.width > 0.0
    }
}

/// Apply the configured shape mask to a cropped image.
///
/// # Arguments
///
/// * `image` - Crop result
/// * `shape` - Configured crop shape
/// * `border` - Border drawn along the outline
///
/// # Returns
///
/// The masked image. Rectangular and `mask_only` shapes return the image
/// unchanged unless a border is set, in which case the border frames the
/// rectangle.
///
/// # Errors
///
/// [`MaskError::TooFewPoints`] for paths with fewer than 3 points, and
/// [`MaskError::InvalidDimensions`] when no canvas can be allocated.
pub fn apply_shape_mask(
    image: &RasterImage,
    shape: &CropShapeType,
    border: &CropBorder,
) -> Result<RasterImage, MaskError> {
    match shape.outline() {
        MaskOutline::Unmasked if !border.is_visible() => Ok(image.clone()),
        MaskOutline::Unmasked => render_masked(image, &MaskOutline::Unmasked, border),
        outline => render_masked(image, &outline, border),
    }
}

/// Draw `image` clipped to `outline` onto a transparent canvas.
fn render_masked(
    image: &RasterImage,
    outline: &MaskOutline,
    border: &CropBorder,
) -> Result<RasterImage, MaskError> {
    let (width, height) = (image.width, image.height);
    let invalid = || MaskError::InvalidDimensions { width, height };

    let full = Rect::new(0.0, 0.0, width as f64, height as f64);
    let path_rect = if border.is_visible() {
        full.inset_by(border.width, border.width)
    } else {
        full
    };
    let path = build_path(outline, path_rect)?;

    let source = to_pixmap(image).ok_or_else(invalid)?;
    let mut canvas = Pixmap::new(width, height).ok_or_else(invalid)?;

    if border.is_visible() {
        let [r, g, b, a] = border.color;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        let stroke = Stroke {
            width: border.width as f32,
            ..Stroke::default()
        };
        canvas.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    let mut clip = Mask::new(width, height).ok_or_else(invalid)?;
    clip.fill_path(&path, FillRule::Winding, true, Transform::identity());

    canvas.draw_pixmap(
        0,
        0,
        source.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        Some(&clip),
    );

    Ok(from_pixmap(&canvas))
}

/// Build the outline path inside `rect`.
fn build_path(outline: &MaskOutline, rect: Rect) -> Result<Path, MaskError> {
    let (x, y) = (rect.x as f32, rect.y as f32);
    let (w, h) = (rect.width as f32, rect.height as f32);
    let bounds = tiny_skia::Rect::from_xywh(x, y, w, h).ok_or(MaskError::DegeneratePath)?;

    let path = match outline {
        MaskOutline::Unmasked => Some(PathBuilder::from_rect(bounds)),
        MaskOutline::Oval => PathBuilder::from_oval(bounds),
        MaskOutline::RoundedRect {
            radius_to_short_side,
        } => rounded_rect_path(bounds, w.min(h) * *radius_to_short_side as f32),
        MaskOutline::Heart => polyline_path(&heart_points(rect)),
        MaskOutline::Polygon(points) => {
            if points.len() < 3 {
                return Err(MaskError::TooFewPoints {
                    count: points.len(),
                });
            }
            if signed_area(points).abs() < MIN_POLYGON_AREA {
                return Err(MaskError::DegeneratePath);
            }
            let scaled: Vec<Point> = points
                .iter()
                .map(|p| Point::new(rect.x + rect.width * p.x, rect.y + rect.height * p.y))
                .collect();
            polyline_path(&scaled)
        }
    };

    path.ok_or(MaskError::DegeneratePath)
}

/// Smallest enclosed area, in unit-square coordinates, a polygon may have.
const MIN_POLYGON_AREA: f64 = 1e-9;

/// Shoelace area of a closed polygon.
fn signed_area(points: &[Point]) -> f64 {
    let doubled: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    doubled / 2.0
}

fn polyline_path(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first.x as f32, first.y as f32);
    for point in rest {
        builder.line_to(point.x as f32, point.y as f32);
    }
    builder.close();
    builder.finish()
}

fn rounded_rect_path(rect: tiny_skia::Rect, radius: f32) -> Option<Path> {
    let r = radius.clamp(0.0, rect.width().min(rect.height()) / 2.0);
    if r <= 0.0 {
        return Some(PathBuilder::from_rect(rect));
    }
    let (l, t, rt, b) = (rect.left(), rect.top(), rect.right(), rect.bottom());
    let k = r * (1.0 - KAPPA);

    let mut pb = PathBuilder::new();
    pb.move_to(l + r, t);
    pb.line_to(rt - r, t);
    pb.cubic_to(rt - k, t, rt, t + k, rt, t + r);
    pb.line_to(rt, b - r);
    pb.cubic_to(rt, b - k, rt - k, b, rt - r, b);
    pb.line_to(l + r, b);
    pb.cubic_to(l + k, b, l, b - k, l, b - r);
    pb.line_to(l, t + r);
    pb.cubic_to(l, t + k, l + k, t, l + r, t);
    pb.close();
    pb.finish()
}

/// Heart made of two round lobes meeting at a dip, tapering to a point.
fn heart_points(rect: Rect) -> Vec<Point> {
    let (w, h) = (rect.width, rect.height);
    let at = |ux: f64, uy: f64| Point::new(rect.x + w * ux, rect.y + h * uy);
    let radius = ((0.4 * w).powi(2) + (0.3 * h).powi(2)).sqrt() / 2.0;

    let arc = |center: Point, from_deg: f64, sweep_deg: f64| {
        (0..=HEART_ARC_SEGMENTS).map(move |i| {
            let angle = (from_deg + sweep_deg * i as f64 / HEART_ARC_SEGMENTS as f64).to_radians();
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
    };

    let mut points = vec![at(0.5, 0.95)];
    points.extend(arc(at(0.3, 0.35), 135.0, 180.0));
    points.push(at(0.5, 0.2));
    points.extend(arc(at(0.7, 0.35), 225.0, 180.0));
    points
}

fn to_pixmap(image: &RasterImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width, image.height)?;
    for (dst, src) in pixmap
        .pixels_mut()
        .iter_mut()
        .zip(image.pixels.chunks_exact(4))
    {
        *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Some(pixmap)
}

fn from_pixmap(pixmap: &Pixmap) -> RasterImage {
    let mut pixels = Vec::with_capacity(pixmap.pixels().len() * 4);
    for p in pixmap.pixels() {
        let c = p.demultiply();
        pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RasterImage {
        width: pixmap.width(),
        height: pixmap.height(),
        pixels,
    }
}
