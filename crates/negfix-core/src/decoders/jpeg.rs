//! JPEG image decoder

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::codecs::jpeg::JpegDecoder;
use image::{DynamicImage, ImageDecoder};

use super::samples_to_buffer;
use crate::bit_depth::StorageType;
use crate::buffer::PixelBuffer;
use crate::error::CodecError;

/// Decode a JPEG file along with its raw EXIF block, if any. JPEG samples
/// are always 8-bit.
pub(crate) fn decode_jpeg(
    path: &Path,
) -> Result<(PixelBuffer, StorageType, Option<Vec<u8>>), CodecError> {
    let file = File::open(path)?;
    let mut decoder = JpegDecoder::new(BufReader::new(file))
        .map_err(|e| CodecError::Decode(format!("Failed to read JPEG header: {}", e)))?;
    let exif = decoder
        .exif_metadata()
        .map_err(|e| CodecError::Decode(format!("Failed to read JPEG EXIF: {}", e)))?;
    let image = DynamicImage::from_decoder(decoder)
        .map_err(|e| CodecError::Decode(format!("Failed to decode JPEG: {}", e)))?;

    let buffer = match image {
        DynamicImage::ImageLuma8(gray) => {
            let (width, height) = gray.dimensions();
            samples_to_buffer(gray.as_raw(), width, height, 1)?
        }
        other => {
            let rgb = other.to_rgb8();
            let (width, height) = rgb.dimensions();
            samples_to_buffer(rgb.as_raw(), width, height, 3)?
        }
    };

    Ok((buffer, StorageType::U8, exif))
}
