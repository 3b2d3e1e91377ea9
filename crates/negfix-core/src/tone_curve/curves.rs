//! Power-law curves
//!
//! - Contrast: symmetric power curve pivoting on the midpoint
//! - Gamma: plain power curve over the normalized range
//! - Exposure: scale by stops, clipping highlights before the scale-up
//!
//! Contrast and gamma expect input already clipped to `[0, ceiling]`; each
//! point function clamps its input so a negative base is never raised to a
//! fractional power.

use crate::buffer::PixelBuffer;
use crate::error::ToneError;

use super::{validate_ceiling, validate_positive, EXPOSURE_STOP_DIVISOR};

/// Apply the midpoint-pivoting contrast curve.
///
/// `alpha > 1` steepens the curve (more contrast), `alpha < 1` flattens it.
/// `0`, `ceiling / 2` and `ceiling` are fixed points. `alpha == 1` returns
/// the buffer untouched.
pub fn contrast(buffer: PixelBuffer, ceiling: f32, alpha: f32) -> Result<PixelBuffer, ToneError> {
    validate_ceiling(ceiling)?;
    validate_positive("contrast_alpha", alpha)?;

    if alpha == 1.0 {
        return Ok(buffer);
    }

    Ok(buffer.map_values(|v| contrast_point(v, ceiling, alpha)))
}

/// Contrast curve for a single sample
#[inline]
pub fn contrast_point(v: f32, ceiling: f32, alpha: f32) -> f32 {
    let v = v.clamp(0.0, ceiling);
    let mid = 0.5 * ceiling;

    if v < mid {
        mid * (v / mid).powf(alpha)
    } else {
        ceiling - mid * ((ceiling - v) / mid).powf(alpha)
    }
}

/// Apply `v' = (v / ceiling)^g * ceiling`. `g == 1` returns the buffer
/// untouched.
pub fn gamma(buffer: PixelBuffer, ceiling: f32, g: f32) -> Result<PixelBuffer, ToneError> {
    validate_ceiling(ceiling)?;
    validate_positive("gamma", g)?;

    if g == 1.0 {
        return Ok(buffer);
    }

    Ok(buffer.map_values(|v| gamma_point(v, ceiling, g)))
}

/// Gamma curve for a single sample
#[inline]
pub fn gamma_point(v: f32, ceiling: f32, g: f32) -> f32 {
    (v.clamp(0.0, ceiling) / ceiling).powf(g) * ceiling
}

/// Linear gain for an exposure compensation in stops.
///
/// Computed in `f64` and saturated to the positive normal range, so any
/// finite compensation yields a usable gain.
#[inline]
pub fn exposure_scale(compensation: f32) -> f64 {
    2f64.powf(compensation as f64 / EXPOSURE_STOP_DIVISOR as f64)
        .clamp(f64::MIN_POSITIVE, f64::MAX)
}

/// Brighten or darken by `compensation` stops.
///
/// Samples are first clipped to `ceiling / scale` so anything that would
/// overshoot lands exactly on the ceiling after scaling, the way
/// over-exposed highlights clip. `compensation == 0` returns the buffer
/// untouched.
pub fn exposure(
    buffer: PixelBuffer,
    ceiling: f32,
    compensation: f32,
) -> Result<PixelBuffer, ToneError> {
    validate_ceiling(ceiling)?;
    if !compensation.is_finite() {
        return Err(ToneError::invalid(
            "exposure_compensation",
            compensation,
            "must be finite",
        ));
    }

    if compensation == 0.0 {
        return Ok(buffer);
    }

    let scale = exposure_scale(compensation);
    Ok(buffer.map_values(|v| exposure_point(v, ceiling, scale)))
}

/// Exposure for a single sample, given the linear `scale`
#[inline]
pub fn exposure_point(v: f32, ceiling: f32, scale: f64) -> f32 {
    let ceiling = ceiling as f64;
    let pre_clip_ceiling = ceiling / scale;
    ((v as f64).clamp(0.0, pre_clip_ceiling) * scale).clamp(0.0, ceiling) as f32
}
