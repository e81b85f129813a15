//! Error types for vadtrim.

use std::path::PathBuf;

/// Result type alias for vadtrim operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
///
/// Batch callers use this to tell the expected "nothing to extract" outcome
/// apart from real failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Container metadata could not be read or is inconsistent.
    Metadata,
    /// The noise-suppression transform failed.
    Enhance,
    /// Segmentation produced no activity region.
    NoActivity,
    /// A filesystem read, write or delete failed.
    Io,
    /// Configuration or parameter problem.
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Metadata => write!(f, "metadata"),
            Self::Enhance => write!(f, "enhance"),
            Self::NoActivity => write!(f, "no-activity"),
            Self::Io => write!(f, "io"),
            Self::Config => write!(f, "config"),
        }
    }
}

/// Top-level error type for vadtrim.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Failed to render configuration as JSON.
    #[error("failed to serialize config as JSON")]
    ConfigJson {
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Output directory is the input directory and no suffix is set.
    #[error("output directory '{path}' is the input directory; set a non-empty suffix")]
    OutputOverwritesInput {
        /// The shared directory.
        path: PathBuf,
    },

    /// Input directory could not be listed.
    #[error("failed to read input directory '{path}'")]
    InputDirRead {
        /// Path to the directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Input path is not a directory.
    #[error("input path is not a directory: {path}")]
    NotADirectory {
        /// Offending path.
        path: PathBuf,
    },

    /// Failed to read a WAV file.
    #[error("failed to read WAV file '{path}'")]
    WavReadFailed {
        /// Path to the WAV file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: hound::Error,
    },

    /// Failed to write WAV file.
    #[error("failed to write WAV file '{path}'")]
    WavWriteFailed {
        /// Path to the WAV file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: hound::Error,
    },

    /// Buffer parts do not agree with each other.
    #[error("invalid audio buffer: {reason}")]
    InvalidBuffer {
        /// Description of the inconsistency.
        reason: String,
    },

    /// WAV layout cannot be represented.
    #[error("unsupported WAV encoding in '{path}': {reason}")]
    UnsupportedEncoding {
        /// Path to the WAV file.
        path: PathBuf,
        /// Description of the unsupported layout.
        reason: String,
    },

    /// Container metadata could not be read.
    #[error("failed to read audio metadata from '{path}'")]
    MetadataRead {
        /// Path to the audio file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Container metadata disagrees with the decoded audio.
    #[error("audio metadata mismatch in '{path}': {reason}")]
    MetadataMismatch {
        /// Path to the audio file.
        path: PathBuf,
        /// Description of the mismatch.
        reason: String,
    },

    /// Noise suppression failed.
    #[error("failed to enhance '{path}': {reason}")]
    Enhance {
        /// Path to the audio file.
        path: PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// Segmentation found no speech activity.
    #[error("no audio activity detected in '{path}'")]
    NoActivityDetected {
        /// Path to the audio file.
        path: PathBuf,
    },

    /// Failed to create the temporary enhanced artifact.
    #[error("failed to create temporary artifact in '{dir}'")]
    ArtifactCreate {
        /// Directory the artifact was created in.
        dir: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove the temporary enhanced artifact.
    #[error("failed to remove temporary artifact '{path}'")]
    ArtifactRemove {
        /// Path to the artifact.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the batch error log.
    #[error("failed to write error log '{path}'")]
    ErrorLogWrite {
        /// Path to the error log.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Time range is empty or inverted.
    #[error("invalid time range: start {start:.3}s must be before end {end:.3}s")]
    InvalidTimeRange {
        /// Start in seconds.
        start: f64,
        /// End in seconds.
        end: f64,
    },
}

impl Error {
    /// Classify this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MetadataRead { .. } | Self::MetadataMismatch { .. } => ErrorKind::Metadata,
            Self::Enhance { .. } => ErrorKind::Enhance,
            Self::NoActivityDetected { .. } => ErrorKind::NoActivity,
            Self::ConfigDirNotFound
            | Self::ConfigRead { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigValidation { .. }
            | Self::ConfigWrite { .. }
            | Self::ConfigSerialize { .. }
            | Self::ConfigJson { .. }
            | Self::OutputOverwritesInput { .. }
            | Self::InvalidTimeRange { .. } => ErrorKind::Config,
            Self::InputDirRead { .. }
            | Self::NotADirectory { .. }
            | Self::WavReadFailed { .. }
            | Self::WavWriteFailed { .. }
            | Self::UnsupportedEncoding { .. }
            | Self::InvalidBuffer { .. }
            | Self::ArtifactCreate { .. }
            | Self::ArtifactRemove { .. }
            | Self::OutputDirCreateFailed { .. }
            | Self::ErrorLogWrite { .. } => ErrorKind::Io,
        }
    }

    /// Whether this is the expected "no speech found" outcome.
    pub const fn is_no_activity(&self) -> bool {
        matches!(self, Self::NoActivityDetected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_activity_is_distinguishable() {
        let err = Error::NoActivityDetected {
            path: PathBuf::from("a.wav"),
        };
        assert!(err.is_no_activity());
        assert_eq!(err.kind(), ErrorKind::NoActivity);
        assert!(err.to_string().contains("a.wav"));
    }

    #[test]
    fn test_artifact_remove_is_io() {
        let err = Error::ArtifactRemove {
            path: PathBuf::from("/tmp/x.wav"),
            source: std::io::Error::other("boom"),
        };
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(!err.is_no_activity());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::Metadata.to_string(), "metadata");
        assert_eq!(ErrorKind::NoActivity.to_string(), "no-activity");
    }
}
