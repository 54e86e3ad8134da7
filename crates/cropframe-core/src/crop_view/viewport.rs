//! The pannable, zoomable and rotatable image viewport.
//!
//! The viewport shows an image container (the unzoomed image, in container
//! points) through a window of `bounds` size. The window is centered at
//! `center` in view coordinates and turned by a linear `transform`
//! (rotation plus flips). A container point `u` appears on screen at
//!
//! ```text
//! view = center + transform · (zoom · u − offset − bounds / 2)
//! ```

use crate::geometry::{transformed_bounds, Affine, Point, Rect, Size};

/// Slack when checking that the image covers a rectangle.
pub const DEFAULT_CONTAINS_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    center: Point,
    bounds: Size,
    offset: Point,
    zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    initial_min_zoom: f64,
    container_size: Size,
    transform: Affine,
}

impl Viewport {
    pub fn new(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            center: Point::ZERO,
            bounds: Size::ZERO,
            offset: Point::ZERO,
            zoom: 1.0,
            min_zoom,
            max_zoom,
            initial_min_zoom: min_zoom,
            container_size: Size::ZERO,
            transform: Affine::IDENTITY,
        }
    }

    /// Fit the viewport onto `rect` at the starting zoom.
    ///
    /// `container` is the unzoomed image size; it differs from `rect` only in
    /// orientation when the image is shown sideways.
    pub fn reset_by(&mut self, rect: Rect, container: Size) {
        self.min_zoom = self.initial_min_zoom.max(1.0);
        self.zoom = self.min_zoom;
        self.center = rect.center();
        self.bounds = rect.size();
        self.container_size = container;
        self.transform = Affine::IDENTITY;
        let content = self.content_size();
        self.offset = Point::new(
            (content.width - self.bounds.width) / 2.0,
            (content.height - self.bounds.height) / 2.0,
        );
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// Place the window by its untransformed frame.
    pub fn set_frame(&mut self, frame: Rect) {
        self.center = frame.center();
        self.bounds = frame.size();
    }

    /// Scroll bounds: the offset as origin and the window as size.
    pub fn scroll_bounds(&self) -> Rect {
        Rect::new(
            self.offset.x,
            self.offset.y,
            self.bounds.width,
            self.bounds.height,
        )
    }

    pub fn set_scroll_bounds(&mut self, bounds: Rect) {
        self.offset = bounds.origin();
        self.bounds = bounds.size();
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Point) {
        self.offset = offset;
    }

    pub fn zoom_scale(&self) -> f64 {
        self.zoom
    }

    pub fn min_zoom_scale(&self) -> f64 {
        self.min_zoom
    }

    pub fn max_zoom_scale(&self) -> f64 {
        self.max_zoom
    }

    pub fn set_min_zoom_scale(&mut self, zoom: f64) {
        self.min_zoom = zoom;
    }

    pub fn container_size(&self) -> Size {
        self.container_size
    }

    /// Zoomed image size.
    pub fn content_size(&self) -> Size {
        self.container_size.scaled(self.zoom)
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = transform.linear();
    }

    /// Change the zoom within the allowed range, keeping the visible center.
    pub fn set_zoom_scale(&mut self, zoom: f64) {
        let zoom = zoom.min(self.max_zoom).max(self.min_zoom);
        if !zoom.is_finite() || zoom <= 0.0 || self.zoom <= 0.0 {
            return;
        }
        let half = Point::new(self.bounds.width / 2.0, self.bounds.height / 2.0);
        let visible_center = (self.offset + half) * (1.0 / self.zoom);
        self.zoom = zoom;
        self.offset = visible_center * zoom - half;
    }

    /// Zoom so `rect` (container points) fills the window, centered.
    pub fn zoom_to(&mut self, rect: Rect) {
        if rect.is_empty() || self.bounds.is_empty() {
            return;
        }
        let scale = (self.bounds.width / rect.width).min(self.bounds.height / rect.height);
        self.zoom = scale.min(self.max_zoom).max(self.min_zoom);
        let center = rect.center() * self.zoom;
        self.offset = Point::new(
            center.x - self.bounds.width / 2.0,
            center.y - self.bounds.height / 2.0,
        );
    }

    /// Resize the window around its current visible center.
    pub fn update_layout(&mut self, size: Size) {
        let visible_center = Point::new(
            self.offset.x + self.bounds.width / 2.0,
            self.offset.y + self.bounds.height / 2.0,
        );
        self.bounds = size;
        self.offset = Point::new(
            visible_center.x - size.width / 2.0,
            visible_center.y - size.height / 2.0,
        );
    }

    /// Keep the content covering the window.
    pub fn check_content_offset(&mut self) {
        let content = self.content_size();
        self.offset.x = self.offset.x.max(0.0);
        self.offset.y = self.offset.y.max(0.0);
        if content.height - self.offset.y <= self.bounds.height {
            self.offset.y = content.height - self.bounds.height;
        }
        if content.width - self.offset.x <= self.bounds.width {
            self.offset.x = content.width - self.bounds.width;
        }
    }

    /// Smallest zoom at which the content covers the window.
    pub fn bound_zoom_scale(&self) -> f64 {
        if self.container_size.is_empty() {
            return 1.0;
        }
        (self.bounds.width / self.container_size.width)
            .max(self.bounds.height / self.container_size.height)
    }

    pub fn update_min_zoom_scale(&mut self) {
        self.min_zoom = self.bound_zoom_scale();
    }

    pub fn zoom_scale_to_bound(&mut self) {
        let scale = self.bound_zoom_scale();
        self.min_zoom = scale;
        self.set_zoom_scale(scale);
    }

    /// True when the content no longer exceeds the window on some axis.
    pub fn should_scale(&self) -> bool {
        let content = self.content_size();
        content.width / self.bounds.width <= 1.0 || content.height / self.bounds.height <= 1.0
    }

    /// Move the content with a drag of `delta` view points.
    pub fn pan_by(&mut self, delta: Point) {
        if let Some(inverse) = self.transform.inverse() {
            self.offset = self.offset - inverse.apply_vector(delta);
        }
    }

    /// Container point to view point.
    pub fn container_to_view(&self, point: Point) -> Point {
        self.container_to_view_transform().apply(point)
    }

    /// View point to container point.
    pub fn view_to_container(&self, point: Point) -> Option<Point> {
        self.container_to_view_transform()
            .inverse()
            .map(|inverse| inverse.apply(point))
    }

    /// Bounding box in container points of a view rectangle.
    pub fn view_rect_to_container(&self, rect: &Rect) -> Option<Rect> {
        self.container_to_view_transform()
            .inverse()
            .map(|inverse| transformed_bounds(rect, &inverse))
    }

    /// Bounding box in view points of the whole image.
    pub fn image_frame(&self) -> Rect {
        transformed_bounds(
            &Rect::from_size(self.container_size),
            &self.container_to_view_transform(),
        )
    }

    /// True when the image covers every corner of `rect` (view points).
    pub fn contains(&self, rect: &Rect, tolerance: f64) -> bool {
        let Some(inverse) = self.container_to_view_transform().inverse() else {
            return false;
        };
        let area = Rect::from_size(self.container_size).inset_by(-tolerance, -tolerance);
        rect.corners().iter().all(|corner| {
            let p = inverse.apply(*corner);
            p.x >= area.min_x() && p.x <= area.max_x() && p.y >= area.min_y() && p.y <= area.max_y()
        })
    }

    /// Full container-to-view mapping, for drawing the image.
    pub fn container_to_view_transform(&self) -> Affine {
        Affine::translation(self.center.x, self.center.y)
            .concat(&self.transform)
            .translated(
                -self.offset.x - self.bounds.width / 2.0,
                -self.offset.y - self.bounds.height / 2.0,
            )
            .scaled(self.zoom, self.zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    fn test_viewport() -> Viewport {
        let mut viewport = Viewport::new(1.0, 15.0);
        let rect = Rect::new(0.0, 0.0, 400.0, 300.0);
        viewport.reset_by(rect, rect.size());
        viewport
    }

    #[test]
    fn test_reset_maps_container_onto_rect() {
        let viewport = test_viewport();
        assert!(viewport
            .container_to_view(Point::ZERO)
            .approx_eq(Point::ZERO, EPS));
        assert!(viewport
            .container_to_view(Point::new(400.0, 300.0))
            .approx_eq(Point::new(400.0, 300.0), EPS));
        assert!(viewport.image_frame().approx_eq(&Rect::new(0.0, 0.0, 400.0, 300.0), EPS));
    }

    #[test]
    fn test_view_container_round_trip() {
        let mut viewport = test_viewport();
        viewport.set_transform(Affine::rotation(0.3).scaled(-1.0, 1.0));
        viewport.set_zoom_scale(2.5);
        let p = Point::new(123.0, 45.0);
        let back = viewport
            .view_to_container(viewport.container_to_view(p))
            .unwrap();
        assert!(back.approx_eq(p, 1e-9));
    }

    #[test]
    fn test_zoom_keeps_visible_center() {
        let mut viewport = test_viewport();
        viewport.set_zoom_scale(2.0);
        assert_eq!(viewport.offset(), Point::new(200.0, 150.0));
        assert!(viewport
            .container_to_view(Point::new(200.0, 150.0))
            .approx_eq(Point::new(200.0, 150.0), EPS));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut viewport = test_viewport();
        viewport.set_zoom_scale(100.0);
        assert_eq!(viewport.zoom_scale(), 15.0);
        viewport.set_zoom_scale(0.1);
        assert_eq!(viewport.zoom_scale(), 1.0);
    }

    #[test]
    fn test_zoom_to_rect() {
        let mut viewport = test_viewport();
        viewport.zoom_to(Rect::new(100.0, 75.0, 200.0, 150.0));
        assert_eq!(viewport.zoom_scale(), 2.0);
        assert_eq!(viewport.offset(), Point::new(200.0, 150.0));
    }

    #[test]
    fn test_update_layout_keeps_center() {
        let mut viewport = test_viewport();
        viewport.update_layout(Size::new(300.0, 225.0));
        assert_eq!(viewport.offset(), Point::new(50.0, 37.5));
    }

    #[test]
    fn test_check_content_offset_clamps() {
        let mut viewport = test_viewport();
        viewport.set_zoom_scale(2.0);
        viewport.set_offset(Point::new(-10.0, 1000.0));
        viewport.check_content_offset();
        assert_eq!(viewport.offset(), Point::new(0.0, 300.0));
    }

    #[test]
    fn test_bound_zoom_covers_rotated_window() {
        let mut viewport = test_viewport();
        viewport.update_layout(Size::new(500.0, 300.0));
        assert!((viewport.bound_zoom_scale() - 1.25).abs() < EPS);
        viewport.zoom_scale_to_bound();
        assert!((viewport.zoom_scale() - 1.25).abs() < EPS);
        assert!(!viewport.should_scale() || viewport.content_size().width <= 500.0 + EPS);
    }

    #[test]
    fn test_contains_with_rotation() {
        let mut viewport = test_viewport();
        assert!(viewport.contains(&Rect::new(0.0, 0.0, 400.0, 300.0), 0.25));

        viewport.set_transform(Affine::rotation(0.2));
        assert!(!viewport.contains(&Rect::new(0.0, 0.0, 400.0, 300.0), 0.25));
        assert!(viewport.contains(&Rect::new(150.0, 100.0, 100.0, 100.0), 0.25));
    }

    #[test]
    fn test_pan_follows_finger_through_rotation() {
        let mut viewport = test_viewport();
        viewport.set_zoom_scale(2.0);
        viewport.set_transform(Affine::rotation(FRAC_PI_2));
        let before = viewport.container_to_view(Point::new(200.0, 150.0));
        viewport.pan_by(Point::new(10.0, 0.0));
        let after = viewport.container_to_view(Point::new(200.0, 150.0));
        assert!(after.approx_eq(before + Point::new(10.0, 0.0), 1e-9));
    }
}
