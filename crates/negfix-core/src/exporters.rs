//! Image exporters for various output formats
//!
//! Write processed images back to TIFF, PNG or JPEG. Samples are clipped,
//! rescaled to the output precision and rounded on the way out. TIFFs are
//! deflate-compressed; JPEGs can carry the source's EXIF block.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tiff::encoder::{colortype, Compression, DeflateLevel, TiffEncoder};

use crate::bit_depth::{BitDepthPolicy, StorageType};
use crate::buffer::SampleData;
use crate::decoders::ImageFormat;
use crate::error::CodecError;
use crate::pipeline::ProcessedImage;

/// JPEG encoder quality used for every JPEG output
pub const JPEG_QUALITY: u8 = 95;

/// Compression applied to every TIFF output
pub const TIFF_COMPRESSION: Compression = Compression::Deflate(DeflateLevel::Balanced);

/// Export a processed image, returning the sample precision written.
///
/// JPEG output is always 8-bit regardless of `policy`.
pub fn export_image<P: AsRef<Path>>(
    image: &ProcessedImage,
    path: P,
    format: ImageFormat,
    policy: BitDepthPolicy,
) -> Result<StorageType, CodecError> {
    export_image_with_exif(image, path, format, policy, None)
}

/// Export a processed image, embedding `exif` in JPEG output.
///
/// `exif` is the raw TIFF-structured EXIF payload without the `Exif\0\0`
/// marker, as returned by the JPEG decoder. Other formats ignore it.
pub fn export_image_with_exif<P: AsRef<Path>>(
    image: &ProcessedImage,
    path: P,
    format: ImageFormat,
    policy: BitDepthPolicy,
    exif: Option<&[u8]>,
) -> Result<StorageType, CodecError> {
    let path = path.as_ref();
    let channels = image.buffer.channels();
    if channels != 1 && channels != 3 {
        return Err(CodecError::Encode(format!(
            "{} export only supports 1 or 3 channels, got {}",
            format, channels
        )));
    }

    let requested = policy.resolve(image.storage);
    let storage = if format.supports_16bit() {
        requested
    } else {
        StorageType::U8
    };
    if storage != requested {
        tracing::debug!(%format, "writing 8-bit samples");
    }

    let width = image.buffer.width() as u32;
    let height = image.buffer.height() as u32;
    let samples = image.to_samples(storage);

    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    match format {
        ImageFormat::Tiff => write_tiff(writer, width, height, channels, &samples)?,
        ImageFormat::Png => write_png(writer, width, height, channels, &samples)?,
        ImageFormat::Jpeg => write_jpeg(writer, width, height, channels, &samples, exif)?,
    }

    tracing::debug!(path = %path.display(), %format, %storage, "exported image");
    Ok(storage)
}

fn write_tiff(
    writer: BufWriter<File>,
    width: u32,
    height: u32,
    channels: usize,
    samples: &SampleData,
) -> Result<(), CodecError> {
    let mut encoder = TiffEncoder::new(writer)
        .map_err(|e| CodecError::Encode(format!("Failed to create TIFF encoder: {}", e)))?
        .with_compression(TIFF_COMPRESSION);

    let result = match (channels, samples) {
        (1, SampleData::U8(data)) => encoder.write_image::<colortype::Gray8>(width, height, data),
        (1, SampleData::U16(data)) => {
            encoder.write_image::<colortype::Gray16>(width, height, data)
        }
        (_, SampleData::U8(data)) => encoder.write_image::<colortype::RGB8>(width, height, data),
        (_, SampleData::U16(data)) => encoder.write_image::<colortype::RGB16>(width, height, data),
    };
    result.map_err(|e| CodecError::Encode(format!("Failed to write TIFF image: {}", e)))
}

fn write_png(
    writer: BufWriter<File>,
    width: u32,
    height: u32,
    channels: usize,
    samples: &SampleData,
) -> Result<(), CodecError> {
    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(if channels == 1 {
        png::ColorType::Grayscale
    } else {
        png::ColorType::Rgb
    });

    let bytes = match samples {
        SampleData::U8(data) => {
            encoder.set_depth(png::BitDepth::Eight);
            data.clone()
        }
        SampleData::U16(data) => {
            encoder.set_depth(png::BitDepth::Sixteen);
            // PNG 16-bit is big-endian
            data.iter().flat_map(|v| v.to_be_bytes()).collect()
        }
    };

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| CodecError::Encode(format!("Failed to write PNG header: {}", e)))?;
    png_writer
        .write_image_data(&bytes)
        .map_err(|e| CodecError::Encode(format!("Failed to write PNG data: {}", e)))?;
    png_writer
        .finish()
        .map_err(|e| CodecError::Encode(format!("Failed to finish PNG: {}", e)))
}

fn write_jpeg(
    mut writer: BufWriter<File>,
    width: u32,
    height: u32,
    channels: usize,
    samples: &SampleData,
    exif: Option<&[u8]>,
) -> Result<(), CodecError> {
    let SampleData::U8(data) = samples else {
        return Err(CodecError::Encode(
            "JPEG export requires 8-bit samples".to_string(),
        ));
    };
    let color = if channels == 1 {
        ExtendedColorType::L8
    } else {
        ExtendedColorType::Rgb8
    };

    let mut encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    if let Some(exif) = exif.filter(|exif| !exif.is_empty()) {
        encoder
            .set_exif_metadata(exif.to_vec())
            .map_err(|e| CodecError::Encode(format!("Failed to attach EXIF: {}", e)))?;
    }
    encoder
        .write_image(data, width, height, color)
        .map_err(|e| CodecError::Encode(format!("Failed to write JPEG image: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{ChannelVector, PixelBuffer};
    use crate::decoders::decode_image;
    use tempfile::tempdir;

    fn processed(buffer: PixelBuffer, storage: StorageType) -> ProcessedImage {
        let channels = buffer.channels();
        ProcessedImage {
            buffer,
            storage,
            black_point: ChannelVector::splat(0.0, channels),
            white_point: ChannelVector::splat(storage.ceiling(), channels),
        }
    }

    fn gradient(width: usize, height: usize, channels: usize, ceiling: f32) -> PixelBuffer {
        let len = width * height * channels;
        let data = (0..len)
            .map(|i| (i as f32 / (len - 1) as f32 * ceiling).round())
            .collect();
        PixelBuffer::new(height, width, channels, data).unwrap()
    }

    // ========================================================================
    // Lossless formats
    // ========================================================================

    #[test]
    fn test_tiff16_rgb_reads_back_identically() {
        let buffer = gradient(8, 4, 3, 65535.0);
        let image = processed(buffer.clone(), StorageType::U16);
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.tif");

        let written =
            export_image(&image, &path, ImageFormat::Tiff, BitDepthPolicy::MatchInput).unwrap();
        assert_eq!(written, StorageType::U16);

        let decoded = decode_image(&path).unwrap();
        assert_eq!(decoded.storage, StorageType::U16);
        assert_eq!(decoded.format, ImageFormat::Tiff);
        assert_eq!(decoded.buffer, buffer);
    }

    #[test]
    fn test_png_gray8_reads_back_identically() {
        let buffer = gradient(5, 3, 1, 255.0);
        let image = processed(buffer.clone(), StorageType::U8);
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.png");

        export_image(&image, &path, ImageFormat::Png, BitDepthPolicy::MatchInput).unwrap();

        let decoded = decode_image(&path).unwrap();
        assert_eq!(decoded.channels(), 1);
        assert_eq!(decoded.storage, StorageType::U8);
        assert_eq!(decoded.buffer, buffer);
    }

    #[test]
    fn test_png16_is_big_endian() {
        let buffer = PixelBuffer::new(1, 1, 3, vec![258.0, 0.0, 65535.0]).unwrap();
        let image = processed(buffer.clone(), StorageType::U16);
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.png");

        export_image(&image, &path, ImageFormat::Png, BitDepthPolicy::MatchInput).unwrap();
        let decoded = decode_image(&path).unwrap();
        assert_eq!(decoded.buffer, buffer);
    }

    #[test]
    fn test_tiff_is_deflate_compressed() {
        use tiff::decoder::Decoder;
        use tiff::tags::{CompressionMethod, Tag};

        let buffer = gradient(16, 8, 3, 255.0);
        let image = processed(buffer.clone(), StorageType::U8);
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.tif");

        export_image(&image, &path, ImageFormat::Tiff, BitDepthPolicy::MatchInput).unwrap();

        let mut decoder = Decoder::new(File::open(&path).unwrap()).unwrap();
        let compression = decoder.get_tag_unsigned::<u16>(Tag::Compression).unwrap();
        assert_eq!(compression, CompressionMethod::Deflate.to_u16());
        assert_eq!(decode_image(&path).unwrap().buffer, buffer);
    }

    // ========================================================================
    // Bit depth policy
    // ========================================================================

    #[test]
    fn test_force_8bit_rescales_sixteen_bit_samples() {
        let buffer = PixelBuffer::new(1, 2, 1, vec![0.0, 65535.0]).unwrap();
        let image = processed(buffer, StorageType::U16);
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.tif");

        let written =
            export_image(&image, &path, ImageFormat::Tiff, BitDepthPolicy::Force8Bit).unwrap();
        assert_eq!(written, StorageType::U8);

        let decoded = decode_image(&path).unwrap();
        assert_eq!(decoded.storage, StorageType::U8);
        assert_eq!(decoded.buffer.data(), &[0.0, 255.0]);
    }

    #[test]
    fn test_jpeg_is_always_8bit() {
        let buffer = gradient(16, 16, 3, 65535.0);
        let image = processed(buffer, StorageType::U16);
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.jpg");

        let written =
            export_image(&image, &path, ImageFormat::Jpeg, BitDepthPolicy::Force16Bit).unwrap();
        assert_eq!(written, StorageType::U8);

        let decoded = decode_image(&path).unwrap();
        assert_eq!(decoded.storage, StorageType::U8);
        assert_eq!(decoded.buffer.shape(), (16, 16, 3));
    }

    #[test]
    fn test_jpeg_flat_gray_survives_compression() {
        let buffer = PixelBuffer::filled(8, 8, 1, 128.0).unwrap();
        let image = processed(buffer, StorageType::U8);
        let dir = tempdir().unwrap();
        let path = dir.path().join("flat.jpeg");

        export_image(&image, &path, ImageFormat::Jpeg, BitDepthPolicy::MatchInput).unwrap();
        let decoded = decode_image(&path).unwrap();
        assert_eq!(decoded.channels(), 1);
        for &v in decoded.buffer.data() {
            assert!((v - 128.0).abs() <= 2.0, "sample {}", v);
        }
    }

    /// Big-endian TIFF header followed by an empty IFD
    const MINIMAL_EXIF: &[u8] = &[
        b'M', b'M', 0x00, 0x2a, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn test_jpeg_exif_survives_round_trip() {
        let buffer = PixelBuffer::filled(8, 8, 3, 100.0).unwrap();
        let image = processed(buffer, StorageType::U8);
        let dir = tempdir().unwrap();
        let source = dir.path().join("source.jpg");
        let copy = dir.path().join("copy.jpg");

        export_image_with_exif(
            &image,
            &source,
            ImageFormat::Jpeg,
            BitDepthPolicy::MatchInput,
            Some(MINIMAL_EXIF),
        )
        .unwrap();
        let decoded = decode_image(&source).unwrap();
        assert_eq!(decoded.exif.as_deref(), Some(MINIMAL_EXIF));

        export_image_with_exif(
            &image,
            &copy,
            ImageFormat::Jpeg,
            BitDepthPolicy::MatchInput,
            decoded.exif.as_deref(),
        )
        .unwrap();
        assert_eq!(decode_image(&copy).unwrap().exif.as_deref(), Some(MINIMAL_EXIF));
    }

    #[test]
    fn test_jpeg_without_exif_decodes_none() {
        let buffer = PixelBuffer::filled(8, 8, 1, 60.0).unwrap();
        let image = processed(buffer, StorageType::U8);
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.jpg");

        export_image(&image, &path, ImageFormat::Jpeg, BitDepthPolicy::MatchInput).unwrap();
        assert_eq!(decode_image(&path).unwrap().exif, None);
    }

    // ========================================================================
    // Failures
    // ========================================================================

    #[test]
    fn test_two_channel_buffer_rejected() {
        let buffer = PixelBuffer::filled(2, 2, 2, 10.0).unwrap();
        let image = processed(buffer, StorageType::U8);
        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.tif");

        let result = export_image(&image, &path, ImageFormat::Tiff, BitDepthPolicy::MatchInput);
        assert!(matches!(result, Err(CodecError::Encode(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let buffer = PixelBuffer::filled(2, 2, 3, 10.0).unwrap();
        let image = processed(buffer, StorageType::U8);
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("scan.tif");

        let result = export_image(&image, &path, ImageFormat::Tiff, BitDepthPolicy::MatchInput);
        assert!(matches!(result, Err(CodecError::Io(_))));
    }
}
