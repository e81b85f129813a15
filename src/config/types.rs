//! Configuration type definitions.

use crate::constants::DEFAULT_OUTPUT_SUFFIX;
use crate::constants::denoise::{DEFAULT_INITIAL_NOISE_FRAMES, DEFAULT_NOISE_THRESHOLD};
use crate::constants::normalize::DEFAULT_HEADROOM_DB;
use crate::detection::DetectionParams;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Segmentation parameters.
    #[serde(default)]
    pub detection: DetectionParams,

    /// Enhancement settings.
    #[serde(default)]
    pub enhance: EnhanceConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Settings for the enhancement pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Leading 20 ms frames used to seed the noise estimate.
    pub initial_noise_frames: usize,

    /// VAD level below which the noise estimate keeps adapting.
    pub noise_threshold: f64,

    /// Peak ceiling below full scale, in dB.
    pub headroom_db: f64,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            initial_noise_frames: DEFAULT_INITIAL_NOISE_FRAMES,
            noise_threshold: DEFAULT_NOISE_THRESHOLD,
            headroom_db: DEFAULT_HEADROOM_DB,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Suffix inserted before `.wav` in directory mode.
    pub suffix: String,

    /// Directory for temporary enhanced artifacts (system default if unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            temp_dir: None,
        }
    }
}
