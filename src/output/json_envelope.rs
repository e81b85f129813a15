//! JSON envelope types for CLI output.
//!
//! With `--json`, every command prints exactly one envelope line on stdout so
//! vadtrim can be driven from scripts.

use crate::constants::json::SPEC_VERSION;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::pipeline::{BatchReport, Extraction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// JSON envelope wrapping all CLI output events.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
pub struct JsonEnvelope<T> {
    /// API specification version.
    pub spec_version: String,
    /// Event timestamp.
    pub timestamp: DateTime<Utc>,
    /// Event type.
    pub event: EventType,
    /// Event-specific payload.
    pub payload: T,
}

impl<T: Serialize> JsonEnvelope<T> {
    /// Create a new envelope with the current timestamp.
    pub fn new(event: EventType, payload: T) -> Self {
        Self {
            spec_version: SPEC_VERSION.to_string(),
            timestamp: Utc::now(),
            event,
            payload,
        }
    }
}

/// Event types for JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// Final result.
    Result,
    /// Command failed.
    Error,
}

/// Result type discriminator for result payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    /// Single file extraction.
    Extraction,
    /// Directory run summary.
    Batch,
    /// Configuration display.
    Config,
}

/// Payload for a single file extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionPayload {
    /// Result type discriminator.
    pub result_type: ResultType,
    /// Input file.
    pub input: PathBuf,
    /// Output file.
    pub output: PathBuf,
    /// Region start in seconds.
    pub start_secs: f64,
    /// Region end in seconds.
    pub end_secs: f64,
    /// Saved duration in seconds.
    pub duration_secs: f64,
    /// Regions found by the segmenter.
    pub region_count: usize,
    /// Output sample rate.
    pub sample_rate: u32,
    /// Output channel count.
    pub channels: u16,
    /// Output bit depth.
    pub bits_per_sample: u16,
    /// Wall-clock processing time in seconds.
    pub elapsed_secs: f64,
}

impl ExtractionPayload {
    /// Build the payload for `extraction` of `input`.
    pub fn new(input: &Path, extraction: &Extraction) -> Self {
        Self {
            result_type: ResultType::Extraction,
            input: input.to_path_buf(),
            output: extraction.output.clone(),
            start_secs: extraction.region.start_secs,
            end_secs: extraction.region.end_secs,
            duration_secs: extraction.audio.duration_secs(),
            region_count: extraction.region_count,
            sample_rate: extraction.audio.sample_rate(),
            channels: extraction.audio.channels(),
            bits_per_sample: extraction.audio.encoding().bits_per_sample,
            elapsed_secs: extraction.elapsed_secs,
        }
    }
}

/// One failed file in a batch payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureEntry {
    /// Input file.
    pub path: PathBuf,
    /// Error class.
    pub kind: String,
    /// Error message.
    pub message: String,
}

/// Payload for a directory run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPayload {
    /// Result type discriminator.
    pub result_type: ResultType,
    /// Input directory.
    pub input_dir: PathBuf,
    /// Output directory.
    pub output_dir: PathBuf,
    /// Files attempted.
    pub processed: usize,
    /// Files saved.
    pub saved: usize,
    /// Files failed.
    pub failed: usize,
    /// Error log path, when written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_log: Option<PathBuf>,
    /// Per-file failures.
    pub failures: Vec<FailureEntry>,
}

impl BatchPayload {
    /// Build the payload for a finished directory run.
    pub fn new(input_dir: &Path, output_dir: &Path, report: &BatchReport) -> Self {
        Self {
            result_type: ResultType::Batch,
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            processed: report.processed,
            saved: report.saved.len(),
            failed: report.failures.len(),
            error_log: report.error_log.clone(),
            failures: report
                .failures
                .iter()
                .map(|f| FailureEntry {
                    path: f.input.clone(),
                    kind: f.kind.to_string(),
                    message: f.message.clone(),
                })
                .collect(),
        }
    }
}

/// Payload for config show result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigPayload {
    /// Result type discriminator.
    pub result_type: ResultType,
    /// Path to the config file.
    pub config_path: PathBuf,
    /// The configuration contents (as JSON value for flexibility).
    pub config: serde_json::Value,
}

impl ConfigPayload {
    /// Build the payload for `config` loaded from `config_path`.
    pub fn new(config_path: &Path, config: &Config) -> Result<Self> {
        let config = serde_json::to_value(config).map_err(|e| Error::ConfigJson { source: e })?;
        Ok(Self {
            result_type: ResultType::Config,
            config_path: config_path.to_path_buf(),
            config,
        })
    }
}

/// Error payload for error events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Error class.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl From<&Error> for ErrorPayload {
    fn from(error: &Error) -> Self {
        Self {
            code: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

fn emit<T: Serialize>(event: EventType, payload: T) {
    let envelope = JsonEnvelope::new(event, payload);
    match serde_json::to_string(&envelope) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            // Log to stderr so it doesn't corrupt JSON output stream
            eprintln!("error: failed to serialize JSON result: {e}");
        }
    }
}

/// Emit a JSON result event to stdout.
pub fn emit_json_result<T: Serialize>(payload: &T) {
    emit(EventType::Result, payload);
}

/// Emit a JSON error event to stdout.
pub fn emit_json_error(error: &Error) {
    emit(EventType::Error, ErrorPayload::from(error));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pipeline::BatchFailure;

    #[test]
    fn test_envelope_serialization() {
        let payload = ConfigPayload {
            result_type: ResultType::Config,
            config_path: PathBuf::from("/etc/vadtrim/config.toml"),
            config: serde_json::json!({"output": {"suffix": "_out"}}),
        };
        let envelope = JsonEnvelope::new(EventType::Result, payload);

        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"spec_version\":\"1.0\""));
        assert!(json.contains("\"event\":\"result\""));
        assert!(json.contains("\"result_type\":\"config\""));
    }

    #[test]
    fn test_config_payload_carries_values() {
        let payload =
            ConfigPayload::new(Path::new("/etc/vadtrim/config.toml"), &Config::default()).unwrap();
        assert_eq!(payload.config["output"]["suffix"], "_out");
        assert_eq!(payload.config["detection"]["energy_threshold"], 55.0);
    }

    #[test]
    fn test_batch_payload_counts() {
        let report = BatchReport {
            processed: 3,
            saved: vec![PathBuf::from("/o/a_out.wav"), PathBuf::from("/o/b_out.wav")],
            failures: vec![BatchFailure {
                input: PathBuf::from("/i/c.wav"),
                kind: ErrorKind::NoActivity,
                message: "no audio activity detected in '/i/c.wav'".to_string(),
            }],
            error_log: Some(PathBuf::from("/i/errors.txt")),
        };
        let payload = BatchPayload::new(Path::new("/i"), Path::new("/o"), &report);
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"saved\":2"));
        assert!(json.contains("\"failed\":1"));
        assert!(json.contains("\"kind\":\"no-activity\""));
    }

    #[test]
    fn test_batch_payload_skips_missing_log() {
        let payload = BatchPayload::new(Path::new("/i"), Path::new("/o"), &BatchReport::default());
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("error_log"));
    }

    #[test]
    fn test_error_payload_from_error() {
        let error = Error::NoActivityDetected {
            path: PathBuf::from("quiet.wav"),
        };
        let payload = ErrorPayload::from(&error);
        assert_eq!(payload.code, "no-activity");
        assert!(payload.message.contains("quiet.wav"));
    }
}
