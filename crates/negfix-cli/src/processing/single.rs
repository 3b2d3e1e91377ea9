//! Single image processing functions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use negfix_core::decoders::{decode_image, DecodedImage, ImageFormat};
use negfix_core::exporters::export_image_with_exif;
use negfix_core::{process_image, BitDepthPolicy, ChannelVector, StorageType, ToneParams};

use crate::parsers::broadcast_point;

/// Outcome of one converted file
#[derive(Debug, Clone)]
pub struct ConvertReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub format: ImageFormat,
    pub input_storage: StorageType,
    pub output_storage: StorageType,
    pub black_point: ChannelVector,
    pub white_point: ChannelVector,
}

/// Fit single-value points to the image's channel count.
pub fn params_for_image(params: &ToneParams, channels: usize) -> ToneParams {
    ToneParams {
        black_point: params
            .black_point
            .as_ref()
            .map(|p| broadcast_point(p, channels)),
        white_point: params
            .white_point
            .as_ref()
            .map(|p| broadcast_point(p, channels)),
        ..params.clone()
    }
}

/// Run an already decoded image through the pipeline and export it.
pub fn process_decoded(
    decoded: DecodedImage,
    input: &Path,
    output: &Path,
    params: &ToneParams,
    policy: BitDepthPolicy,
) -> Result<ConvertReport> {
    let format = decoded.format;
    let input_storage = decoded.storage;
    let params = params_for_image(params, decoded.channels());
    let exif = decoded.exif;

    let processed = process_image(decoded.buffer, decoded.storage, &params)
        .with_context(|| format!("Failed to process {}", input.display()))?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory {}", parent.display())
            })?;
        }
    }

    let output_storage =
        export_image_with_exif(&processed, output, format, policy, exif.as_deref())
            .with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(ConvertReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        format,
        input_storage,
        output_storage,
        black_point: processed.black_point,
        white_point: processed.white_point,
    })
}

/// Decode, process and export one file, keeping its container format.
pub fn process_single_image(
    input: &Path,
    output: &Path,
    params: &ToneParams,
    policy: BitDepthPolicy,
) -> Result<ConvertReport> {
    let decoded =
        decode_image(input).with_context(|| format!("Failed to decode {}", input.display()))?;
    process_decoded(decoded, input, output, params, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use negfix_core::buffer::PixelBuffer;
    use negfix_core::exporters::export_image;
    use negfix_core::pipeline::ProcessedImage;
    use tempfile::TempDir;

    fn write_scan(path: &Path, storage: StorageType, data: Vec<f32>, channels: usize) {
        let width = data.len() / channels;
        let buffer = PixelBuffer::new(1, width, channels, data).unwrap();
        let image = ProcessedImage {
            buffer,
            storage,
            black_point: ChannelVector::splat(0.0, channels),
            white_point: ChannelVector::splat(storage.ceiling(), channels),
        };
        let format = ImageFormat::from_path(path).unwrap();
        export_image(&image, path, format, BitDepthPolicy::MatchInput).unwrap();
    }

    #[test]
    fn test_single_point_broadcast_to_rgb() {
        let params = ToneParams {
            black_point: Some(ChannelVector::new(vec![5.0])),
            ..Default::default()
        };
        let fitted = params_for_image(&params, 3);
        assert_eq!(fitted.black_point, Some(ChannelVector::splat(5.0, 3)));
        assert_eq!(fitted.white_point, None);
    }

    #[test]
    fn test_process_tiff_creates_output_folder() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("neg.tif");
        write_scan(&input, StorageType::U16, vec![1000.0, 30000.0, 60000.0], 1);
        let output = dir.path().join("Edits").join("neg-Edit.tif");

        let params = ToneParams {
            invert: true,
            clip: 0.0,
            buffer_margin: 0.0,
            ..Default::default()
        };
        let report =
            process_single_image(&input, &output, &params, BitDepthPolicy::MatchInput).unwrap();

        assert!(output.exists());
        assert_eq!(report.format, ImageFormat::Tiff);
        assert_eq!(report.output_storage, StorageType::U16);
        assert_eq!(report.black_point.as_slice(), &[5535.0]);
        assert_eq!(report.white_point.as_slice(), &[64535.0]);

        // (30000 / 59000) * 65535 = 33323.05
        let written = decode_image(&output).unwrap();
        assert_eq!(written.buffer.data(), &[65535.0, 33323.0, 0.0]);
    }

    #[test]
    fn test_jpeg_convert_keeps_exif() {
        // Big-endian TIFF header followed by an empty IFD
        let exif: &[u8] = &[b'M', b'M', 0, 0x2a, 0, 0, 0, 8, 0, 0, 0, 0, 0, 0];
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("neg.jpg");
        let data: Vec<f32> = (0..64).map(|i| (i * 3) as f32).collect();
        let image = ProcessedImage {
            buffer: PixelBuffer::new(8, 8, 1, data).unwrap(),
            storage: StorageType::U8,
            black_point: ChannelVector::splat(0.0, 1),
            white_point: ChannelVector::splat(255.0, 1),
        };
        export_image_with_exif(
            &image,
            &input,
            ImageFormat::Jpeg,
            BitDepthPolicy::MatchInput,
            Some(exif),
        )
        .unwrap();
        let output = dir.path().join("neg-Edit.jpg");

        let params = ToneParams {
            invert: true,
            ..Default::default()
        };
        process_single_image(&input, &output, &params, BitDepthPolicy::MatchInput).unwrap();

        let written = decode_image(&output).unwrap();
        assert_eq!(written.exif.as_deref(), Some(exif));
    }

    #[test]
    fn test_flat_scan_reports_error_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("flat.png");
        write_scan(&input, StorageType::U8, vec![90.0, 90.0, 90.0], 1);
        let output = dir.path().join("flat-Edit.png");

        let err = process_single_image(
            &input,
            &output,
            &ToneParams::default(),
            BitDepthPolicy::MatchInput,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("degenerate channel"));
        assert!(!output.exists());
    }
}
