//! Negfix Core Library
//!
//! Tone mapping for film scans: optional inversion, histogram-based
//! black/white point estimation, normalization, contrast, gamma and exposure.
//! Decoders, exporters and configuration loading are thin glue around the
//! pipeline.

pub mod bit_depth;
pub mod buffer;
pub mod config;
pub mod decoders;
pub mod error;
pub mod exporters;
pub mod pipeline;
pub mod statistics;
pub mod tone_curve;

// Re-export commonly used types
pub use bit_depth::{BitDepthPolicy, Sample, StorageType};
pub use buffer::{ChannelVector, PixelBuffer, SampleData};
pub use error::{CodecError, ToneError};
pub use pipeline::{process_image, ProcessedImage, ToneParams};
