//! Speech activity segmentation.
//!
//! A [`Segmenter`] turns an enhanced, mono buffer into an ordered list of
//! [`ActivityRegion`]s. [`EnergySegmenter`] does the work in memory;
//! [`ArtifactSegmenter`] hands the buffer over through a temporary WAV file
//! and guarantees the file is gone when it returns.

mod artifact;
mod energy;

pub use artifact::{ArtifactSegmenter, TempArtifact, cleanup_all_artifacts};
pub use energy::{EnergySegmenter, frame_energy_db};

use crate::audio::AudioBuffer;
use crate::constants::detection::{
    DEFAULT_ANALYSIS_WINDOW, DEFAULT_DROP_TRAILING_SILENCE, DEFAULT_ENERGY_THRESHOLD,
    DEFAULT_MAX_DURATION, DEFAULT_MAX_SILENCE, DEFAULT_MIN_DURATION,
};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A contiguous span classified as speech, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityRegion {
    /// Start time in seconds.
    pub start_secs: f64,
    /// End time in seconds.
    pub end_secs: f64,
}

impl ActivityRegion {
    /// Length of the region in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// Parameters forwarded to the segmenter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    /// Longest contiguous region before a forced split, in seconds.
    pub max_duration: f64,
    /// Longest silence tolerated inside a region, in seconds.
    pub max_silence: f64,
    /// Frames below this energy (dB) are silence.
    pub energy_threshold: f64,
    /// Drop trailing silence from each region.
    pub drop_trailing_silence: bool,
    /// Regions shorter than this (seconds) are discarded.
    pub min_duration: f64,
    /// Analysis frame length in seconds.
    pub analysis_window: f64,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            max_duration: DEFAULT_MAX_DURATION,
            max_silence: DEFAULT_MAX_SILENCE,
            energy_threshold: DEFAULT_ENERGY_THRESHOLD,
            drop_trailing_silence: DEFAULT_DROP_TRAILING_SILENCE,
            min_duration: DEFAULT_MIN_DURATION,
            analysis_window: DEFAULT_ANALYSIS_WINDOW,
        }
    }
}

/// Finds speech regions in a buffer.
///
/// Returned regions are ordered by start time and do not overlap.
pub trait Segmenter {
    /// Segment `audio` into activity regions.
    fn segment(&self, audio: &AudioBuffer, params: &DetectionParams)
    -> Result<Vec<ActivityRegion>>;
}

/// Pick the region that wins: the earliest-starting one.
///
/// Later regions are ignored even if they are longer or louder.
pub fn select_region(regions: &[ActivityRegion]) -> Option<ActivityRegion> {
    regions.first().copied()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_values() {
        let params = DetectionParams::default();
        assert_eq!(params.max_duration, 30.0);
        assert_eq!(params.max_silence, 1.5);
        assert_eq!(params.energy_threshold, 55.0);
        assert!(params.drop_trailing_silence);
    }

    #[test]
    fn test_select_region_takes_first() {
        let regions = [
            ActivityRegion {
                start_secs: 1.0,
                end_secs: 1.3,
            },
            ActivityRegion {
                start_secs: 4.0,
                end_secs: 9.0,
            },
        ];
        let selected = select_region(&regions).unwrap();
        assert_eq!(selected.start_secs, 1.0);
    }

    #[test]
    fn test_select_region_empty() {
        assert!(select_region(&[]).is_none());
    }

    #[test]
    fn test_params_partial_toml() {
        let params: DetectionParams = toml::from_str("energy_threshold = 40.0").unwrap();
        assert_eq!(params.energy_threshold, 40.0);
        assert_eq!(params.max_silence, 1.5);
    }
}
