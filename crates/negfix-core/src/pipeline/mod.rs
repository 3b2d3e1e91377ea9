//! Tone-mapping pipeline
//!
//! Runs the tone curve operations over one image in a fixed order:
//! invert (optional) → black/white point estimation (unless supplied) →
//! normalize → contrast → gamma → exposure → final clip.
//!
//! The bit depth ceiling is taken once from the native [`StorageType`] and
//! reused by every stage; it is never derived from the promoted buffer.

mod params;


pub use params::ToneParams;

use tracing::{debug, info};

use crate::bit_depth::StorageType;
use crate::buffer::{ChannelVector, PixelBuffer, SampleData};
use crate::error::ToneError;
use crate::statistics::{auto_black_point, auto_points, auto_white_point};
use crate::tone_curve::{check_points, contrast, exposure, gamma, invert, normalize};

/// Result of the processing pipeline
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// Final samples, clipped to `[0, ceiling]` of `storage`
    pub buffer: PixelBuffer,

    /// Native storage type of the source image
    pub storage: StorageType,

    /// Black point used for normalization
    pub black_point: ChannelVector,

    /// White point used for normalization
    pub white_point: ChannelVector,
}

impl ProcessedImage {
    /// Clip, rescale and round into integer samples for an encoder.
    pub fn to_samples(&self, target: StorageType) -> SampleData {
        self.buffer.to_sample_data(self.storage.ceiling(), target)
    }
}

/// Execute the full processing pipeline.
///
/// All parameters are validated before the first stage runs. Automatically
/// estimated points are checked for flat channels before normalization, so
/// an error never comes with a half-processed image.
pub fn process_image(
    buffer: PixelBuffer,
    storage: StorageType,
    params: &ToneParams,
) -> Result<ProcessedImage, ToneError> {
    let channels = buffer.channels();
    params.validate(channels)?;
    if let (Some(black), Some(white)) = (&params.black_point, &params.white_point) {
        check_points(black, white, channels)?;
    }

    let ceiling = storage.ceiling();
    log_stage("input", &buffer);

    let buffer = if params.invert {
        let inverted = invert(buffer, ceiling);
        log_stage("invert", &inverted);
        inverted
    } else {
        buffer
    };

    let (black_point, white_point) = resolve_points(&buffer, params)?;
    check_points(&black_point, &white_point, channels)?;

    let buffer = normalize(
        buffer,
        ceiling,
        &black_point,
        &white_point,
        params.buffer_margin,
    )?;
    log_stage("normalize", &buffer);

    let buffer = contrast(buffer, ceiling, params.contrast_alpha)?;
    log_stage("contrast", &buffer);

    let buffer = gamma(buffer, ceiling, params.gamma)?;
    log_stage("gamma", &buffer);

    let buffer = exposure(buffer, ceiling, params.exposure_compensation)?;
    log_stage("exposure", &buffer);

    let buffer = buffer.clip(ceiling);

    Ok(ProcessedImage {
        buffer,
        storage,
        black_point,
        white_point,
    })
}

/// Use the supplied points and estimate whichever is missing.
fn resolve_points(
    buffer: &PixelBuffer,
    params: &ToneParams,
) -> Result<(ChannelVector, ChannelVector), ToneError> {
    let points = match (&params.black_point, &params.white_point) {
        (Some(black), Some(white)) => (black.clone(), white.clone()),
        (Some(black), None) => (black.clone(), auto_white_point(buffer, params.clip)?),
        (None, Some(white)) => (auto_black_point(buffer, params.clip)?, white.clone()),
        (None, None) => auto_points(buffer, params.clip)?,
    };

    if params.black_point.is_none() || params.white_point.is_none() {
        info!(
            clip = params.clip,
            black = ?points.0.as_slice(),
            white = ?points.1.as_slice(),
            "estimated black/white points"
        );
    }
    Ok(points)
}

fn log_stage(stage: &str, buffer: &PixelBuffer) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        let stats = buffer.stats();
        debug!(
            stage,
            min = stats.min,
            max = stats.max,
            mean = stats.mean,
            "pipeline stage"
        );
    }
}
