//! Configuration validation.

use crate::config::{Config, EnhanceConfig, OutputConfig};
use crate::detection::DetectionParams;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_detection(&config.detection)?;
    validate_enhance(&config.enhance)?;
    validate_output(&config.output)?;
    Ok(())
}

fn invalid(message: String) -> Error {
    Error::ConfigValidation { message }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} must be a positive number, got {value}")))
    }
}

/// Validate segmentation parameters.
pub fn validate_detection(params: &DetectionParams) -> Result<()> {
    require_positive("max_duration", params.max_duration)?;
    require_positive("analysis_window", params.analysis_window)?;

    if !(params.max_silence.is_finite() && params.max_silence >= 0.0) {
        return Err(invalid(format!(
            "max_silence must be non-negative, got {}",
            params.max_silence
        )));
    }

    if !(params.min_duration.is_finite() && params.min_duration >= 0.0) {
        return Err(invalid(format!(
            "min_duration must be non-negative, got {}",
            params.min_duration
        )));
    }

    if !params.energy_threshold.is_finite() {
        return Err(invalid(format!(
            "energy_threshold must be finite, got {}",
            params.energy_threshold
        )));
    }

    if params.analysis_window > params.max_duration {
        return Err(invalid(format!(
            "analysis_window ({}s) must not exceed max_duration ({}s)",
            params.analysis_window, params.max_duration
        )));
    }

    Ok(())
}

fn validate_enhance(enhance: &EnhanceConfig) -> Result<()> {
    if enhance.initial_noise_frames == 0 {
        return Err(invalid("initial_noise_frames must be at least 1".to_string()));
    }

    if !enhance.noise_threshold.is_finite() {
        return Err(invalid(format!(
            "noise_threshold must be finite, got {}",
            enhance.noise_threshold
        )));
    }

    if !(enhance.headroom_db.is_finite() && enhance.headroom_db >= 0.0) {
        return Err(invalid(format!(
            "headroom_db must be non-negative, got {}",
            enhance.headroom_db
        )));
    }

    Ok(())
}

fn validate_output(output: &OutputConfig) -> Result<()> {
    if output.suffix.contains(['/', '\\']) {
        return Err(invalid(format!(
            "output suffix must not contain path separators, got '{}'",
            output.suffix
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn message(result: Result<()>) -> String {
        match result {
            Err(Error::ConfigValidation { message }) => message,
            other => format!("{other:?}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_non_positive_max_duration() {
        let mut config = Config::default();
        config.detection.max_duration = 0.0;
        assert!(message(validate_config(&config)).contains("max_duration"));
    }

    #[test]
    fn test_rejects_window_longer_than_max_duration() {
        let mut config = Config::default();
        config.detection.max_duration = 0.02;
        assert!(message(validate_config(&config)).contains("analysis_window"));
    }

    #[test]
    fn test_rejects_nan_threshold() {
        let mut config = Config::default();
        config.detection.energy_threshold = f64::NAN;
        assert!(message(validate_config(&config)).contains("energy_threshold"));
    }

    #[test]
    fn test_zero_max_silence_allowed() {
        let mut config = Config::default();
        config.detection.max_silence = 0.0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_zero_noise_frames() {
        let mut config = Config::default();
        config.enhance.initial_noise_frames = 0;
        assert!(message(validate_config(&config)).contains("initial_noise_frames"));
    }

    #[test]
    fn test_rejects_negative_headroom() {
        let mut config = Config::default();
        config.enhance.headroom_db = -1.0;
        assert!(message(validate_config(&config)).contains("headroom_db"));
    }

    #[test]
    fn test_rejects_suffix_with_separator() {
        let mut config = Config::default();
        config.output.suffix = "_a/b".to_string();
        assert!(message(validate_config(&config)).contains("separators"));
    }

    #[test]
    fn test_empty_suffix_allowed() {
        let mut config = Config::default();
        config.output.suffix = String::new();
        assert!(validate_config(&config).is_ok());
    }
}
