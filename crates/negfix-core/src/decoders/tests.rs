//! Tests for image decoders

use super::*;
use std::fs::File;
use std::io::BufWriter;
use tempfile::tempdir;

fn write_png(path: &Path, color: ::png::ColorType, depth: ::png::BitDepth, w: u32, h: u32, bytes: &[u8]) {
    let file = File::create(path).unwrap();
    let mut encoder = ::png::Encoder::new(BufWriter::new(file), w, h);
    encoder.set_color(color);
    encoder.set_depth(depth);
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(bytes).unwrap();
    writer.finish().unwrap();
}

// ============================================================================
// Format detection
// ============================================================================

#[test]
fn test_format_from_extension() {
    assert_eq!(ImageFormat::from_extension("TIF"), Some(ImageFormat::Tiff));
    assert_eq!(ImageFormat::from_extension("tiff"), Some(ImageFormat::Tiff));
    assert_eq!(ImageFormat::from_extension("Png"), Some(ImageFormat::Png));
    assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
    assert_eq!(ImageFormat::from_extension("nef"), None);

    for ext in SUPPORTED_EXTENSIONS {
        assert!(ImageFormat::from_extension(ext).is_some(), "{}", ext);
    }
}

#[test]
fn test_unknown_extension_rejected() {
    assert!(matches!(
        decode_image("scan.bmp"),
        Err(CodecError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        ImageFormat::from_path("no_extension"),
        Err(CodecError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        decode_image(dir.path().join("absent.tif")),
        Err(CodecError::Io(_))
    ));
}

// ============================================================================
// Channel layout
// ============================================================================

#[test]
fn test_alpha_is_dropped() {
    let samples: Vec<u8> = vec![1, 2, 3, 255, 4, 5, 6, 128];
    let buffer = samples_to_buffer(&samples, 2, 1, 4).unwrap();
    assert_eq!(buffer.shape(), (1, 2, 3));
    assert_eq!(buffer.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

    let gray_alpha: Vec<u16> = vec![100, 65535, 200, 0];
    let buffer = samples_to_buffer(&gray_alpha, 1, 2, 2).unwrap();
    assert_eq!(buffer.shape(), (2, 1, 1));
    assert_eq!(buffer.data(), &[100.0, 200.0]);
}

#[test]
fn test_short_sample_buffer_is_shape_mismatch() {
    let samples: Vec<u8> = vec![0; 5];
    assert!(matches!(
        samples_to_buffer(&samples, 2, 1, 3),
        Err(CodecError::Tone(ToneError::ShapeMismatch(_)))
    ));
}

// ============================================================================
// PNG
// ============================================================================

#[test]
fn test_decode_png_rgba16() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan.png");
    // One pixel: R=0x0102, G=0xFFFF, B=0, A=0x8000
    write_png(
        &path,
        ::png::ColorType::Rgba,
        ::png::BitDepth::Sixteen,
        1,
        1,
        &[0x01, 0x02, 0xFF, 0xFF, 0x00, 0x00, 0x80, 0x00],
    );

    let image = decode_image(&path).unwrap();
    assert_eq!(image.storage, StorageType::U16);
    assert_eq!(image.format, ImageFormat::Png);
    assert_eq!(image.channels(), 3);
    assert_eq!(image.buffer.data(), &[258.0, 65535.0, 0.0]);
}

#[test]
fn test_low_bit_depth_png_is_unsupported_storage() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mask.png");
    write_png(
        &path,
        ::png::ColorType::Grayscale,
        ::png::BitDepth::One,
        8,
        1,
        &[0b1010_1010],
    );

    assert!(matches!(
        decode_image(&path),
        Err(CodecError::Tone(ToneError::UnsupportedStorageType(_)))
    ));
}

// ============================================================================
// TIFF
// ============================================================================

#[test]
fn test_decode_tiff_gray16() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scan.TIFF");
    let file = File::create(&path).unwrap();
    let mut encoder = ::tiff::encoder::TiffEncoder::new(BufWriter::new(file)).unwrap();
    encoder
        .write_image::<::tiff::encoder::colortype::Gray16>(3, 2, &[0, 1, 2, 1000, 40000, 65535])
        .unwrap();
    drop(encoder);

    let image = decode_image(&path).unwrap();
    assert_eq!(image.storage, StorageType::U16);
    assert_eq!(image.format, ImageFormat::Tiff);
    assert_eq!((image.height(), image.width(), image.channels()), (2, 3, 1));
    assert_eq!(
        image.buffer.data(),
        &[0.0, 1.0, 2.0, 1000.0, 40000.0, 65535.0]
    );
}

#[test]
fn test_float_tiff_is_unsupported_storage() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("float.tif");
    let file = File::create(&path).unwrap();
    let mut encoder = ::tiff::encoder::TiffEncoder::new(BufWriter::new(file)).unwrap();
    encoder
        .write_image::<::tiff::encoder::colortype::Gray32Float>(2, 1, &[0.25, 0.75])
        .unwrap();
    drop(encoder);

    assert!(matches!(
        decode_image(&path),
        Err(CodecError::Tone(ToneError::UnsupportedStorageType(_)))
    ));
}
