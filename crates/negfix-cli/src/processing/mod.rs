//! Image processing and input handling.

mod input;
mod single;

pub use input::{
    determine_batch_output_path, determine_output_path, expand_inputs, is_supported_image,
    OutputNaming, SUPPORTED_EXTENSIONS,
};
pub use single::{params_for_image, process_decoded, process_single_image, ConvertReport};
