//! Histogram statistics for black/white point estimation
//!
//! Points are per-channel quantiles of the sample distribution. A small clip
//! fraction is discarded from each tail so hot or dead pixels do not drag
//! the estimate to the extremes.

use rayon::prelude::*;

use crate::buffer::{ChannelVector, PixelBuffer};
use crate::error::ToneError;

/// Default proportion of the histogram discarded across both tails
pub const DEFAULT_CLIP: f32 = 0.001;

/// Check that a clip fraction lies in `[0, 1)`.
pub fn validate_clip(clip: f32) -> Result<(), ToneError> {
    if !(0.0..1.0).contains(&clip) {
        return Err(ToneError::invalid("clip", clip, "must be in [0, 1)"));
    }
    Ok(())
}

/// Suggest a black point: the `0.5 * clip` quantile of each channel.
pub fn auto_black_point(buffer: &PixelBuffer, clip: f32) -> Result<ChannelVector, ToneError> {
    validate_clip(clip)?;
    Ok(channel_quantiles(buffer, &[black_quantile(clip)])
        .pop()
        .unwrap_or_default())
}

/// Suggest a white point: the `1 - 0.5 * clip` quantile of each channel.
pub fn auto_white_point(buffer: &PixelBuffer, clip: f32) -> Result<ChannelVector, ToneError> {
    validate_clip(clip)?;
    Ok(channel_quantiles(buffer, &[white_quantile(clip)])
        .pop()
        .unwrap_or_default())
}

/// Black and white points from a single sort of each channel.
pub fn auto_points(
    buffer: &PixelBuffer,
    clip: f32,
) -> Result<(ChannelVector, ChannelVector), ToneError> {
    validate_clip(clip)?;
    let mut points = channel_quantiles(buffer, &[black_quantile(clip), white_quantile(clip)]);
    let white = points.pop().unwrap_or_default();
    let black = points.pop().unwrap_or_default();
    Ok((black, white))
}

/// Quantile `q` of every channel, with `q` in `[0, 1]`.
pub fn channel_quantile(buffer: &PixelBuffer, q: f32) -> Result<ChannelVector, ToneError> {
    if !(0.0..=1.0).contains(&q) {
        return Err(ToneError::invalid("quantile", q, "must be in [0, 1]"));
    }
    Ok(channel_quantiles(buffer, &[q as f64]).pop().unwrap_or_default())
}

#[inline]
fn black_quantile(clip: f32) -> f64 {
    0.5 * clip as f64
}

#[inline]
fn white_quantile(clip: f32) -> f64 {
    1.0 - 0.5 * clip as f64
}

/// One ChannelVector per requested quantile. Channels are sorted in parallel.
fn channel_quantiles(buffer: &PixelBuffer, quantiles: &[f64]) -> Vec<ChannelVector> {
    let per_channel: Vec<Vec<f32>> = (0..buffer.channels())
        .into_par_iter()
        .map(|c| {
            let mut values: Vec<f32> = buffer.channel_values(c).collect();
            values.sort_unstable_by(f32::total_cmp);
            quantiles
                .iter()
                .map(|&q| quantile_sorted(&values, q))
                .collect()
        })
        .collect();

    (0..quantiles.len())
        .map(|i| ChannelVector::new(per_channel.iter().map(|qs| qs[i]).collect()))
        .collect()
}

/// Quantile of sorted values with linear interpolation between ranks.
///
/// The rank position is `q * (n - 1)`; a fractional position blends the two
/// neighbouring samples.
pub(crate) fn quantile_sorted(sorted: &[f32], q: f64) -> f32 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            let frac = pos - lo as f64;
            let low = sorted[lo] as f64;
            let high = sorted[hi] as f64;
            (low + (high - low) * frac) as f32
        }
    }
}
