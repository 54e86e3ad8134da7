//! Core types for source images.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Size;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// Pixel buffer length does not match the dimensions.
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Normal (no transformation needed).
    #[default]
    Normal = 1,
    /// Horizontal flip.
    FlipHorizontal = 2,
    /// Rotate 180 degrees.
    Rotate180 = 3,
    /// Vertical flip.
    FlipVertical = 4,
    /// Transpose (flip horizontal + rotate 270 CW).
    Transpose = 5,
    /// Rotate 90 degrees clockwise.
    Rotate90CW = 6,
    /// Transverse (flip horizontal + rotate 90 CW).
    Transverse = 7,
    /// Rotate 270 degrees clockwise (90 CCW).
    Rotate270CW = 8,
}

impl Orientation {
    /// Returns true if this orientation swaps width and height dimensions.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// An RGBA image buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// Create an image from dimensions and RGBA pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DecodeError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(DecodeError::InvalidPixelData {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Fully transparent image of the given dimensions.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Create a RasterImage from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an image::RgbaImage for further processing.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// RGBA value at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let p = self.pixels.get(idx..idx + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

/// The image being cropped: stored pixels plus the orientation they should
/// be displayed with.
#[derive(Debug, Clone)]
pub struct SourceImage {
    raster: RasterImage,
    orientation: Orientation,
}

impl SourceImage {
    pub fn new(raster: RasterImage) -> Self {
        Self::with_orientation(raster, Orientation::Normal)
    }

    pub fn with_orientation(raster: RasterImage, orientation: Orientation) -> Self {
        Self {
            raster,
            orientation,
        }
    }

    pub fn raster(&self) -> &RasterImage {
        &self.raster
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Displayed size, after orientation.
    pub fn size(&self) -> Size {
        let size = self.raster.size();
        if self.orientation.swaps_dimensions() {
            size.swapped()
        } else {
            size
        }
    }

    /// True when the displayed image is wider than tall.
    pub fn is_horizontal(&self) -> bool {
        let size = self.size();
        size.width > size.height
    }

    /// Displayed width divided by displayed height.
    pub fn horizontal_to_vertical_ratio(&self) -> f64 {
        let size = self.size();
        if size.height == 0.0 {
            return 1.0;
        }
        size.width / size.height
    }

    /// Pixels with the orientation baked in, or `None` for an empty image.
    pub fn normalized(&self) -> Option<Cow<'_, RasterImage>> {
        if self.raster.is_empty() {
            return None;
        }
        match self.orientation {
            Orientation::Normal => Some(Cow::Borrowed(&self.raster)),
            orientation => super::apply_orientation(&self.raster, orientation).map(Cow::Owned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_u32() {
        assert_eq!(Orientation::from(1), Orientation::Normal);
        assert_eq!(Orientation::from(6), Orientation::Rotate90CW);
        assert_eq!(Orientation::from(99), Orientation::Normal); // Invalid defaults to Normal
    }

    #[test]
    fn test_orientation_swaps_dimensions() {
        assert!(!Orientation::Normal.swaps_dimensions());
        assert!(!Orientation::FlipHorizontal.swaps_dimensions());
        assert!(!Orientation::Rotate180.swaps_dimensions());
        assert!(!Orientation::FlipVertical.swaps_dimensions());

        assert!(Orientation::Transpose.swaps_dimensions());
        assert!(Orientation::Rotate90CW.swaps_dimensions());
        assert!(Orientation::Transverse.swaps_dimensions());
        assert!(Orientation::Rotate270CW.swaps_dimensions());
    }

    #[test]
    fn test_raster_image_rejects_bad_length() {
        let err = RasterImage::new(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid pixel data: expected 16 bytes (width * height * 4), got 15"
        );
    }

    #[test]
    fn test_raster_image_pixel_access() {
        let mut pixels = vec![0u8; 3 * 2 * 4];
        // Row 1, column 2
        pixels[20..24].copy_from_slice(&[1, 2, 3, 4]);
        let img = RasterImage::new(3, 2, pixels).unwrap();

        assert_eq!(img.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(img.pixel(3, 0), None);
    }

    #[test]
    fn test_source_image_oriented_size() {
        let raster = RasterImage::transparent(60, 40);
        let upright = SourceImage::new(raster.clone());
        assert_eq!(upright.size(), Size::new(60.0, 40.0));
        assert!(upright.is_horizontal());

        let turned = SourceImage::with_orientation(raster, Orientation::Rotate90CW);
        assert_eq!(turned.size(), Size::new(40.0, 60.0));
        assert!(!turned.is_horizontal());
        assert!((turned.horizontal_to_vertical_ratio() - 40.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_source_image_normalized_borrows_when_upright() {
        let source = SourceImage::new(RasterImage::transparent(4, 4));
        assert!(matches!(source.normalized(), Some(Cow::Borrowed(_))));
    }

    #[test]
    fn test_source_image_normalized_empty() {
        let source = SourceImage::new(RasterImage::transparent(0, 0));
        assert!(source.normalized().is_none());
    }
}
