//! Shared utilities for negfix-cli
//!
//! Argument structs, parsers and per-file processing used by the `negfix`
//! binary's commands.

pub mod args;
pub mod parsers;
pub mod processing;

// Re-export commonly used items at the crate root for convenience
pub use args::ToneArgs;
pub use parsers::{broadcast_point, parse_channel_vector};
pub use processing::{
    determine_batch_output_path, determine_output_path, expand_inputs, process_single_image,
    ConvertReport, OutputNaming, SUPPORTED_EXTENSIONS,
};
