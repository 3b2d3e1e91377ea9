//! Tone pipeline parameters

use crate::buffer::ChannelVector;
use crate::error::ToneError;
use crate::statistics::{validate_clip, DEFAULT_CLIP};
use crate::tone_curve::{validate_fraction, validate_positive, DEFAULT_BUFFER_MARGIN};

/// Parameters for one run of the tone pipeline
///
/// Treated as immutable once a run starts; batch processing shares a single
/// instance across worker threads.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneParams {
    /// Invert the scan before anything else (negatives)
    pub invert: bool,

    /// Histogram tail fraction discarded when estimating points, in `[0, 1)`
    pub clip: f32,

    /// Output headroom reserved by normalization, in `[0, 1)`
    pub buffer_margin: f32,

    /// Contrast curve steepness (1.0 = no change)
    pub contrast_alpha: f32,

    /// Gamma exponent (1.0 = no change)
    pub gamma: f32,

    /// Exposure compensation in stops (0.0 = no change)
    pub exposure_compensation: f32,

    /// Manual black point in native units, measured after inversion
    pub black_point: Option<ChannelVector>,

    /// Manual white point in native units, measured after inversion
    pub white_point: Option<ChannelVector>,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            invert: false,
            clip: DEFAULT_CLIP,
            buffer_margin: DEFAULT_BUFFER_MARGIN,
            contrast_alpha: 1.0,
            gamma: 1.0,
            exposure_compensation: 0.0,
            black_point: None,
            white_point: None,
        }
    }
}

impl ToneParams {
    /// Check every parameter against a buffer with `channels` channels.
    pub fn validate(&self, channels: usize) -> Result<(), ToneError> {
        validate_clip(self.clip)?;
        validate_fraction("buffer_margin", self.buffer_margin)?;
        validate_positive("contrast_alpha", self.contrast_alpha)?;
        validate_positive("gamma", self.gamma)?;

        if !self.exposure_compensation.is_finite() {
            return Err(ToneError::invalid(
                "exposure_compensation",
                self.exposure_compensation,
                "must be finite",
            ));
        }

        if let Some(black) = &self.black_point {
            black.check_channels("black point", channels)?;
        }
        if let Some(white) = &self.white_point {
            white.check_channels("white point", channels)?;
        }
        Ok(())
    }
}
