//! Bit depth model
//!
//! Maps a buffer's native integer storage to its bit depth ceiling, the
//! largest representable sample value. The ceiling is the upper clip bound
//! and the scale factor for every normalized computation in the pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ToneError;

/// Native sample precision of an image at the I/O boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// 8-bit unsigned samples
    U8,
    /// 16-bit unsigned samples
    U16,
}

impl StorageType {
    /// Number of bits per sample
    pub const fn bits(self) -> u32 {
        match self {
            StorageType::U8 => 8,
            StorageType::U16 => 16,
        }
    }

    /// Maximum representable sample value, `2^bits - 1`
    pub const fn ceiling(self) -> f32 {
        match self {
            StorageType::U8 => 255.0,
            StorageType::U16 => 65535.0,
        }
    }

    /// Look up the storage type for a bit count reported by a decoder.
    pub fn from_bits(bits: u32) -> Result<Self, ToneError> {
        match bits {
            8 => Ok(StorageType::U8),
            16 => Ok(StorageType::U16),
            other => Err(ToneError::UnsupportedStorageType(format!(
                "{}-bit samples",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageType::U8 => write!(f, "u8"),
            StorageType::U16 => write!(f, "u16"),
        }
    }
}

impl FromStr for StorageType {
    type Err = ToneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "u8" | "uint8" | "8" => Ok(StorageType::U8),
            "u16" | "uint16" | "16" => Ok(StorageType::U16),
            other => Err(ToneError::UnsupportedStorageType(other.to_string())),
        }
    }
}

/// Integer sample types that can enter and leave a [`crate::PixelBuffer`].
pub trait Sample: Copy + Send + Sync {
    /// Storage type tag for this sample type
    const STORAGE: StorageType;

    fn to_f32(self) -> f32;

    /// Convert from an already clipped, rounded value.
    fn from_f32(value: f32) -> Self;
}

impl Sample for u8 {
    const STORAGE: StorageType = StorageType::U8;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value as u8
    }
}

impl Sample for u16 {
    const STORAGE: StorageType = StorageType::U16;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value as u16
    }
}

/// Output sample precision policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitDepthPolicy {
    /// Write samples in the precision the input was read with
    #[default]
    MatchInput,

    /// Always write 8-bit samples
    #[serde(rename = "force_8bit")]
    Force8Bit,

    /// Always write 16-bit samples
    #[serde(rename = "force_16bit")]
    Force16Bit,
}

impl BitDepthPolicy {
    /// Resolve the output storage type for an image read as `native`.
    pub fn resolve(self, native: StorageType) -> StorageType {
        match self {
            BitDepthPolicy::MatchInput => native,
            BitDepthPolicy::Force8Bit => StorageType::U8,
            BitDepthPolicy::Force16Bit => StorageType::U16,
        }
    }
}

impl FromStr for BitDepthPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "match" | "match-input" | "match_input" => Ok(BitDepthPolicy::MatchInput),
            "8" | "u8" => Ok(BitDepthPolicy::Force8Bit),
            "16" | "u16" => Ok(BitDepthPolicy::Force16Bit),
            other => Err(format!(
                "Unknown bit depth '{}' (expected match, 8 or 16)",
                other
            )),
        }
    }
}
