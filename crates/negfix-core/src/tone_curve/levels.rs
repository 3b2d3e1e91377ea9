//! Inversion and black/white point normalization

use crate::buffer::{ChannelVector, PixelBuffer};
use crate::error::ToneError;

use super::{validate_ceiling, validate_fraction};

/// Invert a negative: `v' = ceiling - v`.
///
/// Inputs in `[0, ceiling]` stay in `[0, ceiling]`, so no clipping is done.
pub fn invert(buffer: PixelBuffer, ceiling: f32) -> PixelBuffer {
    buffer.map_values(|v| ceiling - v)
}

/// Stretch each channel so its black point lands at `buffer_margin / 2` and
/// its white point at `1 - buffer_margin / 2` of the output range.
///
/// Values beyond the points are compressed into the margin rather than
/// clipped; only what still falls outside `[0, ceiling]` is clipped. With a
/// zero margin this is an exact affine rescale of `[black, white]` onto
/// `[0, ceiling]`.
pub fn normalize(
    buffer: PixelBuffer,
    ceiling: f32,
    black_point: &ChannelVector,
    white_point: &ChannelVector,
    buffer_margin: f32,
) -> Result<PixelBuffer, ToneError> {
    validate_ceiling(ceiling)?;
    validate_fraction("buffer_margin", buffer_margin)?;
    let channels = buffer.channels();
    check_points(black_point, white_point, channels)?;

    let black = black_point.as_slice().to_vec();
    let white = white_point.as_slice().to_vec();

    Ok(buffer.map_channels(|c, v| normalize_point(v, black[c], white[c], buffer_margin, ceiling)))
}

/// Normalize a single sample. The caller guarantees `white != black`.
#[inline]
pub fn normalize_point(v: f32, black: f32, white: f32, buffer_margin: f32, ceiling: f32) -> f32 {
    let t = (v - black) / (white - black);
    let buffered = t * (1.0 - buffer_margin) + buffer_margin / 2.0;
    (buffered * ceiling).clamp(0.0, ceiling)
}

/// Check black/white vectors against the channel count and reject flat
/// channels.
pub(crate) fn check_points(
    black_point: &ChannelVector,
    white_point: &ChannelVector,
    channels: usize,
) -> Result<(), ToneError> {
    black_point.check_channels("black point", channels)?;
    white_point.check_channels("white point", channels)?;

    for (channel, (black, white)) in black_point.iter().zip(white_point.iter()).enumerate() {
        if !black.is_finite() {
            return Err(ToneError::invalid("black_point", black, "must be finite"));
        }
        if !white.is_finite() {
            return Err(ToneError::invalid("white_point", white, "must be finite"));
        }
        if white == black {
            return Err(ToneError::DegenerateChannel {
                channel,
                value: black,
            });
        }
    }
    Ok(())
}
