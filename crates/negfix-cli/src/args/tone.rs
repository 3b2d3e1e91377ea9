//! Tone parameter arguments for CLI commands.

use clap::Args;

use negfix_core::config::PipelineDefaults;
use negfix_core::{BitDepthPolicy, ChannelVector, ToneParams};

use crate::parsers::parse_channel_vector;

/// Tone arguments shared between Convert and Batch commands.
/// Every flag left unset falls back to the loaded config defaults.
#[derive(Args, Clone, Debug, Default)]
pub struct ToneArgs {
    /// Invert the scan before processing (colour or B&W negatives)
    #[arg(long, conflicts_with = "no_invert")]
    pub invert: bool,

    /// Do not invert, even if the config enables it
    #[arg(long)]
    pub no_invert: bool,

    /// Histogram tail fraction discarded when estimating black/white points
    #[arg(long, value_name = "FRACTION")]
    pub clip: Option<f32>,

    /// Output headroom fraction reserved at both ends by normalization
    #[arg(long, value_name = "FRACTION")]
    pub buffer_margin: Option<f32>,

    /// Contrast curve steepness (1.0 = no change, >1.0 = more contrast)
    #[arg(long, value_name = "ALPHA")]
    pub contrast: Option<f32>,

    /// Gamma exponent (1.0 = no change, <1.0 = brighter midtones)
    #[arg(long, value_name = "GAMMA")]
    pub gamma: Option<f32>,

    /// Exposure compensation in stops (0.0 = no change)
    #[arg(long, value_name = "STOPS", allow_hyphen_values = true)]
    pub exposure: Option<f32>,

    /// Manual black point, one value per channel or one value for all (e.g. 12,9,7)
    #[arg(long, value_name = "V[,V,V]", value_parser = parse_channel_vector)]
    pub black_point: Option<ChannelVector>,

    /// Manual white point, one value per channel or one value for all
    #[arg(long, value_name = "V[,V,V]", value_parser = parse_channel_vector)]
    pub white_point: Option<ChannelVector>,

    /// Output bit depth: "match" (default), "8" or "16"
    #[arg(long, value_name = "DEPTH")]
    pub bit_depth: Option<BitDepthPolicy>,
}

impl ToneArgs {
    /// Merge these flags over config defaults.
    pub fn resolve(&self, defaults: &PipelineDefaults) -> (ToneParams, BitDepthPolicy) {
        let mut params = defaults.to_tone_params();

        if self.invert {
            params.invert = true;
        } else if self.no_invert {
            params.invert = false;
        }
        if let Some(clip) = self.clip {
            params.clip = clip;
        }
        if let Some(margin) = self.buffer_margin {
            params.buffer_margin = margin;
        }
        if let Some(alpha) = self.contrast {
            params.contrast_alpha = alpha;
        }
        if let Some(gamma) = self.gamma {
            params.gamma = gamma;
        }
        if let Some(stops) = self.exposure {
            params.exposure_compensation = stops;
        }
        if self.black_point.is_some() {
            params.black_point = self.black_point.clone();
        }
        if self.white_point.is_some() {
            params.white_point = self.white_point.clone();
        }

        let policy = self.bit_depth.unwrap_or(defaults.bit_depth_policy);
        (params, policy)
    }
}
