//! Error types for negfix-core.
//!
//! [`ToneError`] covers everything the tone-mapping pipeline can reject.
//! [`CodecError`] covers decoding, encoding and configuration I/O and wraps
//! [`ToneError`] so the glue code can propagate both with `?`.

use std::io;

/// Failure of a tone-mapping operation.
///
/// Every variant is detected before a buffer is modified, so an `Err` never
/// comes with a partially transformed image.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToneError {
    /// The native sample precision has no supported bit depth ceiling.
    #[error("unsupported storage type: {0}")]
    UnsupportedStorageType(String),

    /// Buffer dimensions or channel vector lengths do not line up.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Black and white point coincide, so the channel cannot be normalized.
    #[error("degenerate channel {channel}: black point equals white point ({value})")]
    DegenerateChannel { channel: usize, value: f32 },

    /// A numeric parameter is outside its valid domain.
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        reason: &'static str,
    },
}

impl ToneError {
    pub(crate) fn shape(message: impl Into<String>) -> Self {
        ToneError::ShapeMismatch(message.into())
    }

    pub(crate) fn invalid(name: &'static str, value: f32, reason: &'static str) -> Self {
        ToneError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

/// Failure while reading or writing images or configuration.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Tone(#[from] ToneError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File extension that no decoder/encoder handles.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Decode(String),

    #[error("{0}")]
    Encode(String),

    /// Explicitly requested config file that cannot be used.
    #[error("{0}")]
    Config(String),
}
