use serde::Serialize;
use std::path::PathBuf;

use anyhow::{Context, Result};

use negfix_core::config::PipelineDefaults;
use negfix_core::decoders::decode_image;
use negfix_core::statistics::auto_points;
use negfix_core::tone_curve::invert;
use negfix_core::PixelBuffer;

use super::convert::format_point;

/// Analysis result structure for JSON output.
///
/// Contains image metadata, the estimated black/white points and
/// per-channel statistics, in native sample units.
#[derive(Serialize)]
pub struct AnalysisResult {
    pub file: String,
    pub format: String,
    pub dimensions: [usize; 2],
    pub channels: usize,
    pub storage: String,
    pub inverted: bool,
    pub clip: f32,
    pub black_point: Vec<f32>,
    pub white_point: Vec<f32>,
    pub channel_stats: Vec<ChannelStat>,
}

/// Statistics for a single channel.
#[derive(Serialize)]
pub struct ChannelStat {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

/// Compute min, max, and mean for each channel of a buffer.
pub fn compute_channel_stats(buffer: &PixelBuffer) -> Vec<ChannelStat> {
    (0..buffer.channels())
        .map(|c| {
            let mut min = f32::MAX;
            let mut max = f32::MIN;
            let mut sum = 0.0f64;
            for v in buffer.channel_values(c) {
                min = min.min(v);
                max = max.max(v);
                sum += v as f64;
            }
            ChannelStat {
                min,
                max,
                mean: (sum / buffer.pixel_count() as f64) as f32,
            }
        })
        .collect()
}

/// Execute the analyze command to inspect an image and estimate its
/// black/white points without writing any output image.
pub fn cmd_analyze(
    input: PathBuf,
    clip: Option<f32>,
    invert_scan: Option<bool>,
    json_output: bool,
    save: Option<PathBuf>,
    defaults: &PipelineDefaults,
) -> Result<()> {
    let clip = clip.unwrap_or(defaults.clip);
    let inverted = invert_scan.unwrap_or(defaults.invert);

    let decoded =
        decode_image(&input).with_context(|| format!("Failed to decode {}", input.display()))?;
    let format = decoded.format;
    let storage = decoded.storage;

    let buffer = if inverted {
        invert(decoded.buffer, storage.ceiling())
    } else {
        decoded.buffer
    };

    let (black_point, white_point) = auto_points(&buffer, clip)
        .with_context(|| format!("Failed to estimate points for {}", input.display()))?;

    let result = AnalysisResult {
        file: input.display().to_string(),
        format: format.to_string(),
        dimensions: [buffer.width(), buffer.height()],
        channels: buffer.channels(),
        storage: storage.to_string(),
        inverted,
        clip,
        black_point: black_point.as_slice().to_vec(),
        white_point: white_point.as_slice().to_vec(),
        channel_stats: compute_channel_stats(&buffer),
    };

    if json_output {
        let json =
            serde_json::to_string_pretty(&result).context("Failed to serialize analysis")?;
        println!("{}", json);
    } else {
        println!("Analyzing: {}\n", input.display());

        println!("Image Info:");
        println!("  Format: {} ({})", result.format, result.storage);
        println!("  Dimensions: {}x{}", result.dimensions[0], result.dimensions[1]);
        println!("  Channels: {}", result.channels);
        if inverted {
            println!("  Inverted before analysis");
        }

        println!("\nPoint Estimation (clip {}):", clip);
        println!("  Black point: {}", format_point(&result.black_point));
        println!("  White point: {}", format_point(&result.white_point));

        println!("\nChannel Statistics:");
        for (c, stat) in result.channel_stats.iter().enumerate() {
            println!(
                "  [{}] min={:.1}, max={:.1}, mean={:.1}",
                c, stat.min, stat.max, stat.mean
            );
        }

        let degenerate: Vec<usize> = (0..black_point.len())
            .filter(|&c| black_point[c] == white_point[c])
            .collect();
        if !degenerate.is_empty() {
            println!(
                "\nWarning: channel(s) {:?} are flat and cannot be normalized",
                degenerate
            );
        }

        println!("\nUsage:");
        println!(
            "  negfix convert {} --black-point {} --white-point {}",
            input.display(),
            join_values(&result.black_point),
            join_values(&result.white_point)
        );
    }

    if let Some(save_path) = save {
        let json =
            serde_json::to_string_pretty(&result).context("Failed to serialize analysis")?;
        std::fs::write(&save_path, &json)
            .with_context(|| format!("Failed to write analysis file {}", save_path.display()))?;
        if !json_output {
            println!("\nAnalysis saved to: {}", save_path.display());
        }
    }

    Ok(())
}

fn join_values(values: &[f32]) -> String {
    values
        .iter()
        .map(|v| format!("{:.1}", v))
        .collect::<Vec<_>>()
        .join(",")
}
