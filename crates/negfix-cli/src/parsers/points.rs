//! Parsing functions for black/white point values.

use negfix_core::ChannelVector;

/// Parse point values in format "V" or "V,V,V"
///
/// # Arguments
/// * `points_str` - Comma-separated sample values in native units (0-255 or 0-65535)
///
/// # Returns
/// A channel vector with one entry per listed value
pub fn parse_channel_vector(points_str: &str) -> Result<ChannelVector, String> {
    let parts: Vec<&str> = points_str.split(',').collect();
    if points_str.trim().is_empty() {
        return Err("Point must be in format V or V,V,V (e.g., 12,9,7)".to_string());
    }

    let mut values = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        let value = part
            .trim()
            .parse::<f32>()
            .map_err(|_| format!("Invalid value for channel {}: {}", i, part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(format!(
                "Channel {} value {} must be finite and >= 0",
                i, value
            ));
        }
        values.push(value);
    }

    Ok(ChannelVector::new(values))
}

/// Expand a single-value point to `channels` entries.
///
/// Multi-value points are returned unchanged; the pipeline rejects a length
/// that does not match the image.
pub fn broadcast_point(point: &ChannelVector, channels: usize) -> ChannelVector {
    if point.len() == 1 && channels > 1 {
        ChannelVector::splat(point[0], channels)
    } else {
        point.clone()
    }
}
