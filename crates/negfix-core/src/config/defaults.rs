//! Default pipeline parameter values.

use serde::{Deserialize, Serialize};

use crate::bit_depth::BitDepthPolicy;
use crate::buffer::ChannelVector;
use crate::pipeline::ToneParams;
use crate::statistics::DEFAULT_CLIP;
use crate::tone_curve::DEFAULT_BUFFER_MARGIN;

/// Suffix appended to the stem of every written file
pub const DEFAULT_EDIT_TAG: &str = "-Edit";

/// Folder (inside the input folder) that receives batch output
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "Edits";

/// Default pipeline parameter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineDefaults {
    /// Invert scans before processing (negatives)
    pub invert: bool,
    /// Histogram tail fraction discarded for point estimation
    pub clip: f32,
    /// Output headroom reserved by normalization
    pub buffer_margin: f32,
    /// Contrast curve steepness (1.0 = no change)
    pub contrast_alpha: f32,
    /// Gamma exponent (1.0 = no change)
    pub gamma: f32,
    /// Exposure compensation in stops (0.0 = no change)
    pub exposure_compensation: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub black_point: Option<ChannelVector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_point: Option<ChannelVector>,
    /// Output sample precision
    pub bit_depth_policy: BitDepthPolicy,
    /// Marker appended to output file stems; inputs containing it are skipped
    pub edit_tag: String,
    /// Name of the output folder created next to batch inputs
    pub output_dir_name: String,
}

impl Default for PipelineDefaults {
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
            bit_depth_policy: BitDepthPolicy::MatchInput,
            edit_tag: DEFAULT_EDIT_TAG.to_string(),
            output_dir_name: DEFAULT_OUTPUT_DIR_NAME.to_string(),
        }
    }
}

impl PipelineDefaults {
    /// Tone parameters described by these defaults
    pub fn to_tone_params(&self) -> ToneParams {
        ToneParams {
            invert: self.invert,
            clip: self.clip,
            buffer_margin: self.buffer_margin,
            contrast_alpha: self.contrast_alpha,
            gamma: self.gamma,
            exposure_compensation: self.exposure_compensation,
            black_point: self.black_point.clone(),
            white_point: self.white_point.clone(),
        }
    }

    /// Replace empty naming fields with the built-in values.
    pub(crate) fn sanitize(&mut self) {
        if self.edit_tag.trim().is_empty() {
            self.edit_tag = DEFAULT_EDIT_TAG.to_string();
        }
        if self.output_dir_name.trim().is_empty() {
            self.output_dir_name = DEFAULT_OUTPUT_DIR_NAME.to_string();
        }
    }
}
