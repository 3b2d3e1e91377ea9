//! Image decoders for various formats
//!
//! Support for TIFF, PNG and JPEG files with 8- or 16-bit integer samples.
//! Grayscale sources decode to one channel and colour sources to three;
//! alpha channels are dropped.

mod jpeg;
mod png;
mod tiff;

#[cfg(test)]
mod tests;

use std::fmt;
use std::path::Path;

use crate::bit_depth::{Sample, StorageType};
use crate::buffer::PixelBuffer;
use crate::error::{CodecError, ToneError};

/// File formats handled at the I/O boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Tiff,
    Png,
    Jpeg,
}

/// Lowercase file extensions accepted as input
pub const SUPPORTED_EXTENSIONS: &[&str] = &["tif", "tiff", "png", "jpg", "jpeg"];

impl ImageFormat {
    /// Format for a (case-insensitive) file extension
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// Format inferred from a path's extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CodecError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                CodecError::UnsupportedFormat(format!("no file extension: {}", path.display()))
            })?;
        Self::from_extension(extension)
            .ok_or_else(|| CodecError::UnsupportedFormat(extension.to_string()))
    }

    /// Canonical extension used when none is carried over from the input
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Tiff => "tif",
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    /// Whether the format can hold 16-bit samples
    pub fn supports_16bit(self) -> bool {
        !matches!(self, ImageFormat::Jpeg)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Tiff => write!(f, "TIFF"),
            ImageFormat::Png => write!(f, "PNG"),
            ImageFormat::Jpeg => write!(f, "JPEG"),
        }
    }
}

/// Decoded image data
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Samples promoted to `f32`, still in native value units
    pub buffer: PixelBuffer,

    /// Native sample precision of the file
    pub storage: StorageType,

    /// Container format the image was read from
    pub format: ImageFormat,

    /// Raw EXIF block of a JPEG source, without the `Exif\0\0` marker
    pub exif: Option<Vec<u8>>,
}

impl DecodedImage {
    pub fn width(&self) -> usize {
        self.buffer.width()
    }

    pub fn height(&self) -> usize {
        self.buffer.height()
    }

    pub fn channels(&self) -> usize {
        self.buffer.channels()
    }
}

/// Decode an image from a file path
pub fn decode_image<P: AsRef<Path>>(path: P) -> Result<DecodedImage, CodecError> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)?;

    let (buffer, storage, exif) = match format {
        ImageFormat::Tiff => {
            let (buffer, storage) = tiff::decode_tiff(path)?;
            (buffer, storage, None)
        }
        ImageFormat::Png => {
            let (buffer, storage) = png::decode_png(path)?;
            (buffer, storage, None)
        }
        ImageFormat::Jpeg => jpeg::decode_jpeg(path)?,
    };

    tracing::debug!(
        path = %path.display(),
        %format,
        %storage,
        width = buffer.width(),
        height = buffer.height(),
        channels = buffer.channels(),
        exif_bytes = exif.as_ref().map_or(0, Vec::len),
        "decoded image"
    );

    Ok(DecodedImage {
        buffer,
        storage,
        format,
        exif,
    })
}

/// Keep the gray or colour channels of interleaved samples.
///
/// `source_channels` is the channel count stored in the file: 1 (gray),
/// 2 (gray + alpha), 3 (RGB) or 4 (RGBA).
pub(crate) fn samples_to_buffer<T: Sample>(
    samples: &[T],
    width: u32,
    height: u32,
    source_channels: usize,
) -> Result<PixelBuffer, CodecError> {
    let (width, height) = (width as usize, height as usize);
    let kept = match source_channels {
        1 | 2 => 1,
        3 | 4 => 3,
        other => {
            return Err(CodecError::Decode(format!(
                "unsupported channel count: {}",
                other
            )))
        }
    };

    let expected = width * height * source_channels;
    if samples.len() < expected {
        return Err(ToneError::ShapeMismatch(format!(
            "decoded buffer size mismatch: expected {}, got {}",
            expected,
            samples.len()
        ))
        .into());
    }
    let samples = &samples[..expected];

    let buffer = if kept == source_channels {
        PixelBuffer::from_samples(height, width, kept, samples)?
    } else {
        let mut stripped = Vec::with_capacity(width * height * kept);
        for pixel in samples.chunks_exact(source_channels) {
            stripped.extend_from_slice(&pixel[..kept]);
        }
        PixelBuffer::from_samples(height, width, kept, &stripped)?
    };
    Ok(buffer)
}
