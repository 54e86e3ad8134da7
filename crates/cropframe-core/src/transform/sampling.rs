//! Pixel sampling for the crop rasterizer.
//!
//! Sample positions use pixel-center coordinates: `(0.0, 0.0)` is the center
//! of the top-left pixel. Neighbors beyond the last row or column are clamped
//! so edges do not fade out.

use crate::decode::RasterImage;

/// Get a pixel as [f64; 4] from an image at the given coordinates.
#[inline]
fn get_pixel_f64(pixels: &[u8], width: usize, px: usize, py: usize) -> [f64; 4] {
    let idx = (py * width + px) * 4;
    [
        pixels[idx] as f64,
        pixels[idx + 1] as f64,
        pixels[idx + 2] as f64,
        pixels[idx + 3] as f64,
    ]
}

/// Sample an RGBA pixel using bilinear interpolation.
///
/// Bilinear interpolation considers the 4 nearest pixels and weights
/// their contribution based on distance.
///
/// # Returns
///
/// The interpolated pixel, or fully transparent when `(x, y)` lies more
/// than half a pixel outside the image.
pub fn sample_bilinear(image: &RasterImage, x: f64, y: f64) -> [u8; 4] {
    sample_bilinear_raw(
        &image.pixels,
        image.width as usize,
        image.height as usize,
        x,
        y,
    )
}

#[inline]
pub(crate) fn sample_bilinear_raw(
    pixels: &[u8],
    width: usize,
    height: usize,
    x: f64,
    y: f64,
) -> [u8; 4] {
    if width == 0
        || height == 0
        || x < -0.5
        || y < -0.5
        || x > width as f64 - 0.5
        || y > height as f64 - 0.5
    {
        return [0, 0, 0, 0];
    }

    let max_x = (width - 1) as f64;
    let max_y = (height - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(pixels, width, x0, y0);
    let p10 = get_pixel_f64(pixels, width, x1, y0);
    let p01 = get_pixel_f64(pixels, width, x0, y1);
    let p11 = get_pixel_f64(pixels, width, x1, y1);

    let mut result = [0u8; 4];
    for i in 0..4 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}
