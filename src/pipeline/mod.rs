//! Processing pipeline components.

mod batch;
mod enhancer;
mod extractor;

pub use batch::{
    BatchFailure, BatchOptions, BatchReport, collect_wav_files, default_output_path,
    output_path_for, run_batch, write_error_log,
};
pub use enhancer::Enhancer;
pub use extractor::{Extraction, Extractor};
