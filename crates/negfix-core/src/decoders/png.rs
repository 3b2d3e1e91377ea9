//! PNG image decoder

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::samples_to_buffer;
use crate::bit_depth::StorageType;
use crate::buffer::PixelBuffer;
use crate::error::{CodecError, ToneError};

/// Decode a PNG file
pub(crate) fn decode_png(path: &Path) -> Result<(PixelBuffer, StorageType), CodecError> {
    let file = File::open(path)?;
    let decoder = png::Decoder::new(BufReader::new(file));
    let mut reader = decoder
        .read_info()
        .map_err(|e| CodecError::Decode(format!("Failed to read PNG info: {}", e)))?;

    let info = reader.info();
    let width = info.width;
    let height = info.height;
    let color_type = info.color_type;
    let bit_depth = info.bit_depth;

    let source_channels = match color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        png::ColorType::Indexed => {
            return Err(CodecError::Decode("Indexed PNG not supported".to_string()));
        }
    };

    let storage = match bit_depth {
        png::BitDepth::Eight => StorageType::U8,
        png::BitDepth::Sixteen => StorageType::U16,
        other => {
            return Err(ToneError::UnsupportedStorageType(format!(
                "{:?} PNG samples",
                other
            ))
            .into());
        }
    };

    let buffer_size = reader
        .output_buffer_size()
        .ok_or_else(|| CodecError::Decode("Failed to determine PNG buffer size".to_string()))?;
    let mut buf = vec![0u8; buffer_size];
    let frame_info = reader
        .next_frame(&mut buf)
        .map_err(|e| CodecError::Decode(format!("Failed to read PNG frame: {}", e)))?;
    let bytes = &buf[..frame_info.buffer_size()];

    let buffer = match storage {
        StorageType::U8 => samples_to_buffer(bytes, width, height, source_channels)?,
        StorageType::U16 => {
            // PNG 16-bit is big-endian
            let samples: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
                .collect();
            samples_to_buffer(&samples, width, height, source_channels)?
        }
    };

    Ok((buffer, storage))
}
