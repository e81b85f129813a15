//! Console output: progress bars and JSON result envelopes.

mod json_envelope;
pub mod progress;

pub use json_envelope::{
    BatchPayload, ConfigPayload, ErrorPayload, EventType, ExtractionPayload, FailureEntry,
    JsonEnvelope, ResultType, emit_json_error, emit_json_result,
};
