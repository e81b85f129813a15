//! Directory mode: run the extractor over every WAV in a folder.

use crate::constants::{DEFAULT_OUTPUT_SUFFIX, ERROR_LOG_FILE_NAME, WAV_EXTENSION};
use crate::error::{Error, ErrorKind, Result};
use crate::output::progress;
use crate::pipeline::Extractor;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Options for a directory run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Suffix inserted before `.wav` in output names.
    pub suffix: String,
    /// Log a progress line every this many files (0 disables).
    pub report_every: usize,
    /// Show a progress bar.
    pub progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            report_every: 0,
            progress: false,
        }
    }
}

/// A file that could not be processed.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    /// Input file.
    pub input: PathBuf,
    /// Error class.
    pub kind: ErrorKind,
    /// Rendered error message.
    pub message: String,
}

/// Summary of a directory run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Files attempted.
    pub processed: usize,
    /// Output files written.
    pub saved: Vec<PathBuf>,
    /// Files that failed, in processing order.
    pub failures: Vec<BatchFailure>,
    /// Error log written into the input directory, if any file failed.
    pub error_log: Option<PathBuf>,
}

/// Check if a path has a `.wav` extension, ignoring case.
fn is_wav_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(OsStr::new(WAV_EXTENSION)))
}

/// List the WAV files directly inside `dir`, sorted by path.
pub fn collect_wav_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let read_error = |e: std::io::Error| Error::InputDirRead {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if path.is_file() && is_wav_file(&path) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Output path for `input` inside `output_dir`: `<stem><suffix>.wav`.
pub fn output_path_for(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().map_or_else(
        || std::borrow::Cow::Borrowed("output"),
        |s| s.to_string_lossy(),
    );
    output_dir.join(format!("{stem}{suffix}.{WAV_EXTENSION}"))
}

/// Default single-file output: `_out` inserted before the extension, next to
/// the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let dir = input
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    output_path_for(input, &dir, DEFAULT_OUTPUT_SUFFIX)
}

/// Whether `a` and `b` resolve to the same existing directory.
fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Write one failing input path per line to `errors.txt` in `dir`.
pub fn write_error_log(dir: &Path, failures: &[BatchFailure]) -> Result<PathBuf> {
    let path = dir.join(ERROR_LOG_FILE_NAME);
    let mut contents = String::new();
    for failure in failures {
        contents.push_str(&failure.input.to_string_lossy());
        contents.push('\n');
    }

    std::fs::write(&path, contents).map_err(|e| Error::ErrorLogWrite {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

/// Process every WAV in `input_dir`, writing outputs to `output_dir`.
///
/// Per-file failures are collected, not propagated. Only problems with the
/// directories themselves or the error log abort the run.
pub fn run_batch(
    extractor: &Extractor,
    input_dir: &Path,
    output_dir: &Path,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let files = collect_wav_files(input_dir)?;
    if options.suffix.is_empty() && same_directory(input_dir, output_dir) {
        return Err(Error::OutputOverwritesInput {
            path: output_dir.to_path_buf(),
        });
    }
    std::fs::create_dir_all(output_dir).map_err(|e| Error::OutputDirCreateFailed {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    info!(
        "Found {} WAV file(s) in {}",
        files.len(),
        input_dir.display()
    );

    let total = files.len();
    let mut report = BatchReport::default();
    let progress_bar = progress::create_file_progress(total, options.progress);

    for (index, input) in files.iter().enumerate() {
        let output = output_path_for(input, output_dir, &options.suffix);
        match extractor.extract(input, &output) {
            Ok(extraction) => report.saved.push(extraction.output),
            Err(e) => {
                if e.is_no_activity() {
                    info!("Skipped {}: {e}", input.display());
                } else {
                    warn!("Failed {}: {e}", input.display());
                }
                report.failures.push(BatchFailure {
                    input: input.clone(),
                    kind: e.kind(),
                    message: e.to_string(),
                });
            }
        }
        report.processed += 1;
        progress::inc_progress(progress_bar.as_ref());

        if options.report_every > 0 && (index + 1) % options.report_every == 0 {
            info!("Processed {}/{total} files", index + 1);
        }
    }

    progress::finish_progress(progress_bar, "Done");

    if !report.failures.is_empty() {
        let log = write_error_log(input_dir, &report.failures)?;
        info!(
            "Listed {} failed file(s) in {}",
            report.failures.len(),
            log.display()
        );
        report.error_log = Some(log);
    }

    Ok(report)
}
