//! Crop rasterization by inverse affine mapping.
//!
//! For every output pixel we compute where its center lands in the source
//! image and sample there. The whole chain is affine, so it collapses into a
//! single matrix:
//!
//! ```text
//! source = scale(source / view) · translate(view / 2)
//!        · inverse(crop transform)
//!        · translate(-crop / 2) · scale(crop / output) · output
//! ```

use crate::decode::{RasterImage, SourceImage};
use crate::geometry::{Affine, Point, Size};

use super::sampling::sample_bilinear_raw;
use super::{CropError, CropInfo};

/// Largest output a single crop may allocate, in pixels (16384 x 16384).
pub const MAX_OUTPUT_PIXELS: u64 = 1 << 28;

/// Output size of a crop, in source pixels.
///
/// The on-screen crop box is mapped back to source units through the ratio
/// between the source and the unzoomed image view, then divided by the zoom:
///
/// ```text
/// output = floor(source / image_view * crop) / |scale|
/// ```
///
/// # Returns
///
/// The unrounded output size; [`Size::ZERO`] when the image view is empty or
/// the scale is zero.
pub fn expected_crop_size(source_size: Size, info: &CropInfo) -> Size {
    let view = info.image_view_size;
    if view.is_empty() || info.scale_x == 0.0 || info.scale_y == 0.0 {
        return Size::ZERO;
    }
    Size::new(
        (source_size.width / view.width * info.crop_size.width).floor() / info.scale_x.abs(),
        (source_size.height / view.height * info.crop_size.height).floor() / info.scale_y.abs(),
    )
}

/// Crop `source` as described by `info`.
///
/// The source orientation is baked into the pixels first, so the math below
/// always runs on the displayed layout.
///
/// # Arguments
///
/// * `source` - Image being edited
/// * `info` - Crop parameters captured from the view
///
/// # Returns
///
/// An RGBA image of [`expected_crop_size`] (truncated to whole pixels).
/// Areas of the crop box not covered by the image are transparent.
///
/// # Errors
///
/// - [`CropError::NormalizationFailed`] if the source is empty
/// - [`CropError::NonInvertibleTransform`] for a zero scale
/// - [`CropError::EmptyOutput`] if the output would have no pixels
/// - [`CropError::OutputTooLarge`] if the output exceeds [`MAX_OUTPUT_PIXELS`]
pub fn crop_image(source: &SourceImage, info: &CropInfo) -> Result<RasterImage, CropError> {
    let normalized = source.normalized().ok_or(CropError::NormalizationFailed)?;
    let image: &RasterImage = &normalized;

    let inverse = info
        .transform()
        .inverse()
        .ok_or(CropError::NonInvertibleTransform)?;

    let size = expected_crop_size(image.size(), info);
    let too_large = CropError::OutputTooLarge {
        width: size.width,
        height: size.height,
    };
    if !size.width.is_finite()
        || !size.height.is_finite()
        || size.width > u32::MAX as f64
        || size.height > u32::MAX as f64
    {
        return Err(too_large);
    }
    let (out_w, out_h) = (size.width as u32, size.height as u32);
    if out_w == 0 || out_h == 0 {
        return Err(CropError::EmptyOutput {
            width: out_w,
            height: out_h,
        });
    }
    if out_w as u64 * out_h as u64 > MAX_OUTPUT_PIXELS {
        return Err(too_large);
    }
    let byte_len = (out_w as usize)
        .checked_mul(out_h as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or(too_large)?;

    let view = info.image_view_size;
    let crop = info.crop_size;
    let output_to_source = Affine::scale(
        image.width as f64 / view.width,
        image.height as f64 / view.height,
    )
    .translated(view.width / 2.0, view.height / 2.0)
    .concat(&inverse)
    .translated(-crop.width / 2.0, -crop.height / 2.0)
    .scaled(crop.width / out_w as f64, crop.height / out_h as f64);

    let (src_w, src_h) = (image.width as usize, image.height as usize);
    let mut output = vec![0u8; byte_len];

    for (y, row) in output.chunks_exact_mut(out_w as usize * 4).enumerate() {
        let start = output_to_source.apply(Point::new(0.5, y as f64 + 0.5));
        for (x, dst) in row.chunks_exact_mut(4).enumerate() {
            let sx = start.x + output_to_source.a * x as f64;
            let sy = start.y + output_to_source.b * x as f64;
            // Back to pixel-center coordinates
            let pixel = sample_bilinear_raw(&image.pixels, src_w, src_h, sx - 0.5, sy - 0.5);
            dst.copy_from_slice(&pixel);
        }
    }

    Ok(RasterImage {
        width: out_w,
        height: out_h,
        pixels: output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::Orientation;
    use std::f64::consts::{FRAC_PI_2, PI};

    /// Each pixel encodes its own coordinates: R = x, G = y.
    fn test_image(width: u32, height: u32) -> SourceImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        SourceImage::new(RasterImage::new(width, height, pixels).unwrap())
    }

    fn identity_info(view: Size) -> CropInfo {
        CropInfo {
            translation: Point::ZERO,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            crop_size: view,
            image_view_size: view,
        }
    }

    #[test]
    fn test_expected_size_full_image() {
        let info = identity_info(Size::new(400.0, 300.0));
        let size = expected_crop_size(Size::new(4000.0, 3000.0), &info);
        assert_eq!((size.width as u32, size.height as u32), (4000, 3000));
    }

    #[test]
    fn test_expected_size_square_box() {
        let info = CropInfo {
            crop_size: Size::new(300.0, 300.0),
            ..identity_info(Size::new(400.0, 300.0))
        };
        let size = expected_crop_size(Size::new(4000.0, 3000.0), &info);
        assert_eq!((size.width as u32, size.height as u32), (3000, 3000));
    }

    #[test]
    fn test_expected_size_divides_by_zoom() {
        let info = CropInfo {
            scale_x: -2.0,
            scale_y: 2.0,
            ..identity_info(Size::new(400.0, 300.0))
        };
        let size = expected_crop_size(Size::new(4000.0, 3000.0), &info);
        assert_eq!((size.width as u32, size.height as u32), (2000, 1500));
    }

    #[test]
    fn test_identity_crop_copies_source() {
        let source = test_image(40, 30);
        let result = crop_image(&source, &identity_info(Size::new(40.0, 30.0))).unwrap();
        assert_eq!(&result, source.raster());
    }

    #[test]
    fn test_identity_crop_scales_view_to_source() {
        let source = test_image(40, 30);
        let result = crop_image(&source, &identity_info(Size::new(4.0, 3.0))).unwrap();
        assert_eq!((result.width, result.height), (40, 30));
        assert_eq!(result.pixel(39, 29), Some([39, 29, 0, 255]));
    }

    #[test]
    fn test_zoomed_crop_takes_center() {
        let source = test_image(40, 40);
        let info = CropInfo {
            scale_x: 2.0,
            scale_y: 2.0,
            ..identity_info(Size::new(40.0, 40.0))
        };
        let result = crop_image(&source, &info).unwrap();
        assert_eq!((result.width, result.height), (20, 20));
        assert_eq!(result.pixel(0, 0), Some([10, 10, 0, 255]));
        assert_eq!(result.pixel(19, 19), Some([29, 29, 0, 255]));
    }

    #[test]
    fn test_tiny_scale_is_rejected() {
        let source = test_image(4, 2);
        let info = CropInfo {
            scale_x: 1e-7,
            scale_y: 1e-7,
            ..identity_info(Size::new(4.0, 2.0))
        };
        assert!(matches!(
            crop_image(&source, &info),
            Err(CropError::OutputTooLarge { .. })
        ));
    }

    #[test]
    fn test_non_finite_size_is_rejected() {
        let source = test_image(4, 2);
        let info = CropInfo {
            crop_size: Size::new(f64::INFINITY, 2.0),
            ..identity_info(Size::new(4.0, 2.0))
        };
        assert!(matches!(
            crop_image(&source, &info),
            Err(CropError::OutputTooLarge { .. })
        ));
    }

    #[test]
    fn test_quarter_turn_swaps_dimensions() {
        let source = test_image(4, 2);
        let info = CropInfo {
            rotation: FRAC_PI_2,
            crop_size: Size::new(2.0, 4.0),
            ..identity_info(Size::new(4.0, 2.0))
        };
        let result = crop_image(&source, &info).unwrap();
        assert_eq!((result.width, result.height), (2, 4));
        // Clockwise: the source's top-left pixel ends up top-right
        assert_eq!(result.pixel(1, 0), Some([0, 0, 0, 255]));
        assert_eq!(result.pixel(0, 3), Some([3, 1, 0, 255]));
    }

    #[test]
    fn test_half_turn_reverses() {
        let source = test_image(4, 2);
        let info = CropInfo {
            rotation: PI,
            ..identity_info(Size::new(4.0, 2.0))
        };
        let result = crop_image(&source, &info).unwrap();
        assert_eq!(result.pixel(0, 0), Some([3, 1, 0, 255]));
    }

    #[test]
    fn test_negative_scale_mirrors() {
        let source = test_image(4, 2);
        let info = CropInfo {
            scale_x: -1.0,
            ..identity_info(Size::new(4.0, 2.0))
        };
        let result = crop_image(&source, &info).unwrap();
        assert_eq!(result.pixel(0, 0), Some([3, 0, 0, 255]));
        assert_eq!(result.pixel(3, 1), Some([0, 1, 0, 255]));
    }

    #[test]
    fn test_uncovered_area_is_transparent() {
        let source = test_image(40, 30);
        let info = CropInfo {
            translation: Point::new(100.0, 0.0),
            ..identity_info(Size::new(40.0, 30.0))
        };
        let result = crop_image(&source, &info).unwrap();
        assert!(result.pixels.chunks_exact(4).all(|p| p[3] == 0));
    }

    #[test]
    fn test_orientation_is_normalized_first() {
        let raster = test_image(4, 2).raster().clone();
        let source = SourceImage::with_orientation(raster, Orientation::Rotate90CW);
        let result = crop_image(&source, &identity_info(Size::new(2.0, 4.0))).unwrap();
        assert_eq!((result.width, result.height), (2, 4));
    }

    #[test]
    fn test_zero_scale_fails() {
        let source = test_image(4, 2);
        let info = CropInfo {
            scale_x: 0.0,
            ..identity_info(Size::new(4.0, 2.0))
        };
        assert!(matches!(
            crop_image(&source, &info),
            Err(CropError::NonInvertibleTransform)
        ));
    }

    #[test]
    fn test_empty_crop_fails() {
        let source = test_image(4, 2);
        let info = CropInfo {
            crop_size: Size::new(0.0, 2.0),
            ..identity_info(Size::new(4.0, 2.0))
        };
        assert!(matches!(
            crop_image(&source, &info),
            Err(CropError::EmptyOutput { width: 0, .. })
        ));
    }

    #[test]
    fn test_empty_source_fails() {
        let source = SourceImage::new(RasterImage::transparent(0, 0));
        let info = identity_info(Size::new(4.0, 2.0));
        assert!(matches!(
            crop_image(&source, &info),
            Err(CropError::NormalizationFailed)
        ));
    }
}

// =============================================================================
// Property-Based Tests
// =============================================================================
