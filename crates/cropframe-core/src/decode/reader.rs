//! Image decoding with deferred EXIF orientation.
//!
//! Decoding keeps the stored pixel layout and records the EXIF orientation on
//! the returned [`SourceImage`]; the crop engine bakes the orientation in at
//! crop time via [`SourceImage::normalized`].

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::imageops;
use image::ImageReader;

use super::{DecodeError, Orientation, RasterImage, SourceImage};

/// Decode a JPEG or PNG image from bytes.
///
/// # Arguments
///
/// * `bytes` - Raw encoded file bytes
///
/// # Returns
///
/// A `SourceImage` with RGBA pixels in stored order and the EXIF orientation
/// (or `Orientation::Normal` when there is none).
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be detected.
/// Returns `DecodeError::CorruptedFile` if the data cannot be decoded.
pub fn decode_image(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    let orientation = extract_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let raster = RasterImage::from_rgba_image(img.into_rgba8());
    Ok(SourceImage::with_orientation(raster, orientation))
}

/// Extract EXIF orientation from encoded image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

/// Bake an EXIF orientation into the pixel layout.
///
/// Returns `None` if the raster's buffer does not match its dimensions.
pub fn apply_orientation(raster: &RasterImage, orientation: Orientation) -> Option<RasterImage> {
    let img = raster.to_rgba_image()?;
    let oriented = match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => imageops::flip_horizontal(&img),
        Orientation::Rotate180 => imageops::rotate180(&img),
        Orientation::FlipVertical => imageops::flip_vertical(&img),
        Orientation::Transpose => imageops::flip_horizontal(&imageops::rotate90(&img)),
        Orientation::Rotate90CW => imageops::rotate90(&img),
        Orientation::Transverse => imageops::flip_horizontal(&imageops::rotate270(&img)),
        Orientation::Rotate270CW => imageops::rotate270(&img),
    };
    Some(RasterImage::from_rgba_image(oriented))
}
