//! TIFF image decoder

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::ColorType;

use super::samples_to_buffer;
use crate::bit_depth::StorageType;
use crate::buffer::PixelBuffer;
use crate::error::{CodecError, ToneError};

/// Decoding limit for large film scans (1GB uncompressed)
const SCAN_BUFFER_LIMIT: usize = 1024 * 1024 * 1024;

/// Decode a TIFF file
pub(crate) fn decode_tiff(path: &Path) -> Result<(PixelBuffer, StorageType), CodecError> {
    let file = File::open(path)?;

    let mut limits = Limits::default();
    limits.decoding_buffer_size = SCAN_BUFFER_LIMIT;
    limits.ifd_value_size = SCAN_BUFFER_LIMIT;
    limits.intermediate_buffer_size = SCAN_BUFFER_LIMIT;

    let mut decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| CodecError::Decode(format!("Failed to create TIFF decoder: {}", e)))?
        .with_limits(limits);

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| CodecError::Decode(format!("Failed to get TIFF dimensions: {}", e)))?;

    let color_type = decoder
        .colortype()
        .map_err(|e| CodecError::Decode(format!("Failed to get TIFF color type: {}", e)))?;
    let source_channels = tiff_channels(color_type)?;

    let image_data = decoder
        .read_image()
        .map_err(|e| CodecError::Decode(format!("Failed to read TIFF image data: {}", e)))?;

    match image_data {
        DecodingResult::U8(buf) => Ok((
            samples_to_buffer(&buf, width, height, source_channels)?,
            StorageType::U8,
        )),
        DecodingResult::U16(buf) => Ok((
            samples_to_buffer(&buf, width, height, source_channels)?,
            StorageType::U16,
        )),
        DecodingResult::U32(_) | DecodingResult::I32(_) | DecodingResult::F32(_) => Err(
            ToneError::UnsupportedStorageType("32-bit TIFF samples".to_string()).into(),
        ),
        DecodingResult::U64(_) | DecodingResult::I64(_) | DecodingResult::F64(_) => Err(
            ToneError::UnsupportedStorageType("64-bit TIFF samples".to_string()).into(),
        ),
        DecodingResult::F16(_) => Err(ToneError::UnsupportedStorageType(
            "16-bit float TIFF samples".to_string(),
        )
        .into()),
        DecodingResult::I8(_) | DecodingResult::I16(_) => Err(ToneError::UnsupportedStorageType(
            "signed integer TIFF samples".to_string(),
        )
        .into()),
    }
}

fn tiff_channels(color_type: ColorType) -> Result<usize, CodecError> {
    match color_type {
        ColorType::Gray(_) => Ok(1),
        ColorType::GrayA(_) => Ok(2),
        ColorType::RGB(_) => Ok(3),
        ColorType::RGBA(_) => Ok(4),
        other => Err(CodecError::Decode(format!(
            "Unsupported TIFF color type: {:?}",
            other
        ))),
    }
}
