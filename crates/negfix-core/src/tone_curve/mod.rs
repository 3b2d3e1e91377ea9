//! Tone curve operations
//!
//! Independent per-sample remappings applied by the pipeline:
//! - `levels`: inversion and black/white point normalization
//! - `curves`: power-law contrast, gamma and exposure compensation
//!
//! Every operation takes the buffer by value and returns the transformed
//! buffer. Parameters are validated before any sample is touched.

mod curves;
mod levels;


pub use curves::{
    contrast, contrast_point, exposure, exposure_point, exposure_scale, gamma, gamma_point,
};
pub use levels::{invert, normalize, normalize_point};

pub(crate) use levels::check_points;

use crate::error::ToneError;

/// Default output headroom reserved by `normalize`
pub const DEFAULT_BUFFER_MARGIN: f32 = 0.01;

/// Exposure compensation stops are divided by this before exponentiation
pub const EXPOSURE_STOP_DIVISOR: f32 = 2.2;

pub(crate) fn validate_ceiling(ceiling: f32) -> Result<(), ToneError> {
    if !ceiling.is_finite() || ceiling <= 0.0 {
        return Err(ToneError::invalid(
            "bit_depth_ceiling",
            ceiling,
            "must be finite and positive",
        ));
    }
    Ok(())
}

pub(crate) fn validate_positive(name: &'static str, value: f32) -> Result<(), ToneError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ToneError::invalid(name, value, "must be finite and > 0"));
    }
    Ok(())
}

pub(crate) fn validate_fraction(name: &'static str, value: f32) -> Result<(), ToneError> {
    if !(0.0..1.0).contains(&value) {
        return Err(ToneError::invalid(name, value, "must be in [0, 1)"));
    }
    Ok(())
}
