//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "vadtrim";

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Suffix inserted before `.wav` for default output names.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_out";

/// Name of the batch failure log written into the input directory.
pub const ERROR_LOG_FILE_NAME: &str = "errors.txt";

/// WAV file extension (without dot).
pub const WAV_EXTENSION: &str = "wav";

/// Activity detection defaults.
pub mod detection {
    /// Maximum length of one region before a forced split, in seconds.
    pub const DEFAULT_MAX_DURATION: f64 = 30.0;

    /// Longest silence tolerated inside a region, in seconds.
    pub const DEFAULT_MAX_SILENCE: f64 = 1.5;

    /// Energy threshold separating silence from activity, in dB.
    pub const DEFAULT_ENERGY_THRESHOLD: f64 = 55.0;

    /// Drop the low-energy tail of each region.
    pub const DEFAULT_DROP_TRAILING_SILENCE: bool = true;

    /// Shortest region kept, in seconds.
    pub const DEFAULT_MIN_DURATION: f64 = 0.2;

    /// Analysis frame length, in seconds.
    pub const DEFAULT_ANALYSIS_WINDOW: f64 = 0.05;

    /// Full scale used for the energy measure.
    ///
    /// Samples are rescaled to the 16-bit range before computing energy so a
    /// threshold has the same meaning at every bit depth.
    pub const ENERGY_FULL_SCALE: f64 = 32768.0;
}

/// Log-MMSE noise suppression constants.
pub mod denoise {
    /// Frame length in seconds.
    pub const FRAME_SECS: f64 = 0.02;

    /// Frame overlap percentage.
    pub const OVERLAP_PERCENT: usize = 50;

    /// Number of leading frames used for the initial noise estimate.
    pub const DEFAULT_INITIAL_NOISE_FRAMES: usize = 6;

    /// VAD decision threshold for adapting the noise estimate.
    pub const DEFAULT_NOISE_THRESHOLD: f64 = 0.15;

    /// Smoothing factor of the decision-directed a-priori SNR.
    pub const PRIOR_SNR_SMOOTHING: f64 = 0.98;

    /// Noise estimate update factor.
    pub const NOISE_UPDATE_FACTOR: f64 = 0.98;

    /// Floor of the a-priori SNR (-25 dB).
    pub const MIN_PRIOR_SNR_DB: f64 = -25.0;

    /// Cap on the a-posteriori SNR.
    pub const MAX_POSTERIOR_SNR: f64 = 40.0;

    /// Lower bound fed to the exponential integral.
    pub const MIN_EXPINT_ARG: f64 = 1e-8;

    /// Floor on the noise power estimate.
    pub const MIN_NOISE_POWER: f64 = 1e-20;
}

/// Amplitude normalization constants.
pub mod normalize {
    /// Headroom left below full scale after peak normalization, in dB.
    pub const DEFAULT_HEADROOM_DB: f64 = 0.1;
}

/// JSON output constants.
pub mod json {
    /// Schema version of the JSON result payloads.
    pub const SPEC_VERSION: &str = "1.0";
}
