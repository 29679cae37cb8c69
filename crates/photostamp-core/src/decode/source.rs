//! JPG / PNG / WebP decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageFormat, ImageReader};

use super::{DecodeError, Orientation, SourceImage};

/// Formats the file picker accepts.
const ACCEPTED_FORMATS: [ImageFormat; 3] = [ImageFormat::Jpeg, ImageFormat::Png, ImageFormat::WebP];

/// Decode an uploaded image, applying EXIF orientation correction.
///
/// The format is sniffed from the bytes rather than trusted from the
/// file name.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for an empty buffer,
/// `DecodeError::UnsupportedFormat` for anything other than JPG, PNG or WebP,
/// and `DecodeError::CorruptedFile` if the decoder gives up.
pub fn decode_image(bytes: &[u8]) -> Result<SourceImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    match reader.format() {
        Some(format) if ACCEPTED_FORMATS.contains(&format) => {}
        _ => return Err(DecodeError::UnsupportedFormat),
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let orientation = get_orientation(bytes);
    let oriented = apply_orientation(img, orientation);

    tracing::debug!(
        width = oriented.width(),
        height = oriented.height(),
        ?orientation,
        "decoded source image"
    );

    Ok(SourceImage::from_rgba_image(oriented.into_rgba8()))
}

/// Read the EXIF orientation tag from an image container.
///
/// Returns `Orientation::Normal` if there is no EXIF block or the tag
/// cannot be read.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
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

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
