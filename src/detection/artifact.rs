//! Temporary enhanced-audio artifacts.
//!
//! Some segmenters consume audio from disk. [`ArtifactSegmenter`] writes the
//! enhanced buffer to a uniquely named temporary WAV, lets the inner segmenter
//! read it back, and removes the file on every exit path. Live artifacts are
//! tracked in a process-wide registry so an interrupt handler can remove them.

use super::{ActivityRegion, DetectionParams, Segmenter};
use crate::audio::{AudioBuffer, decode_wav, encode_wav};
use crate::constants::APP_NAME;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};
use tempfile::NamedTempFile;
use tracing::debug;

/// Global registry of live artifact paths for cleanup on signal.
static ACTIVE_ARTIFACTS: LazyLock<Mutex<Vec<PathBuf>>> =
    LazyLock::new(|| Mutex::new(Vec::new()));

/// Register an artifact path for cleanup on signal.
fn register_artifact(path: &Path) {
    if let Ok(mut artifacts) = ACTIVE_ARTIFACTS.lock() {
        artifacts.push(path.to_path_buf());
    }
}

/// Unregister an artifact path after normal cleanup.
fn unregister_artifact(path: &Path) {
    if let Ok(mut artifacts) = ACTIVE_ARTIFACTS.lock() {
        artifacts.retain(|p| p != path);
    }
}

/// Remove every registered artifact. Called on signal.
pub fn cleanup_all_artifacts() {
    if let Ok(mut artifacts) = ACTIVE_ARTIFACTS.lock() {
        for path in artifacts.drain(..) {
            let _ = fs::remove_file(path);
        }
    }
}

/// RAII guard for an enhanced WAV written to a temporary location.
///
/// The file is deleted by [`TempArtifact::release`] or, failing that, on drop.
#[derive(Debug)]
pub struct TempArtifact {
    file: Option<NamedTempFile>,
    path: PathBuf,
}

impl TempArtifact {
    /// Write `buffer` to a fresh temporary WAV.
    ///
    /// Uses `temp_dir` when given, otherwise the system temporary directory.
    pub fn create(buffer: &AudioBuffer, temp_dir: Option<&Path>) -> Result<Self> {
        let prefix = format!(".{APP_NAME}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix).suffix("_tmp.wav");

        let dir = temp_dir.map_or_else(std::env::temp_dir, Path::to_path_buf);
        let file = builder
            .tempfile_in(&dir)
            .map_err(|e| Error::ArtifactCreate { dir, source: e })?;

        let path = file.path().to_path_buf();
        register_artifact(&path);
        let artifact = Self {
            file: Some(file),
            path,
        };

        encode_wav(buffer, &artifact.path)?;
        debug!("Wrote enhanced artifact {}", artifact.path.display());
        Ok(artifact)
    }

    /// Path of the artifact on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the artifact, reporting removal failures.
    pub fn release(mut self) -> Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        unregister_artifact(&self.path);
        file.close().map_err(|e| Error::ArtifactRemove {
            path: self.path.clone(),
            source: e,
        })
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            drop(file);
            unregister_artifact(&self.path);
        }
    }
}

/// Runs an inner segmenter against a temporary on-disk copy of the audio.
#[derive(Debug, Clone)]
pub struct ArtifactSegmenter<S> {
    inner: S,
    temp_dir: Option<PathBuf>,
}

impl<S: Segmenter> ArtifactSegmenter<S> {
    /// Wrap `inner`, placing artifacts in the system temporary directory.
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            temp_dir: None,
        }
    }

    /// Wrap `inner`, placing artifacts in `dir` (system default when `None`).
    pub const fn in_dir(inner: S, dir: Option<PathBuf>) -> Self {
        Self {
            inner,
            temp_dir: dir,
        }
    }
}

impl<S: Segmenter> Segmenter for ArtifactSegmenter<S> {
    fn segment(
        &self,
        audio: &AudioBuffer,
        params: &DetectionParams,
    ) -> Result<Vec<ActivityRegion>> {
        let artifact = TempArtifact::create(audio, self.temp_dir.as_deref())?;
        let staged = decode_wav(artifact.path())?;
        let regions = self.inner.segment(&staged, params)?;
        artifact.release()?;
        Ok(regions)
    }
}
