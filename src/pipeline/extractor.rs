//! Single file extraction pipeline.

use crate::audio::{AudioBuffer, decode_wav, encode_wav};
use crate::config::Config;
use crate::detection::{
    ActivityRegion, ArtifactSegmenter, DetectionParams, EnergySegmenter, Segmenter, select_region,
};
use crate::error::{Error, Result};
use crate::pipeline::Enhancer;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of a successful extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The saved slice of the original audio.
    pub audio: AudioBuffer,
    /// Region the slice was cut from.
    pub region: ActivityRegion,
    /// Number of regions the segmenter found.
    pub region_count: usize,
    /// Where the slice was written.
    pub output: PathBuf,
    /// Wall-clock processing time in seconds.
    pub elapsed_secs: f64,
}

/// Trims a recording down to its first region of speech activity.
pub struct Extractor {
    enhancer: Enhancer,
    segmenter: Box<dyn Segmenter>,
    params: DetectionParams,
}

impl Extractor {
    /// Build an extractor with default enhancement and temp location.
    pub fn new(params: DetectionParams) -> Self {
        Self::from_config(&Config {
            detection: params,
            ..Config::default()
        })
    }

    /// Build an extractor with the energy segmenter behind a temp artifact.
    pub fn from_config(config: &Config) -> Self {
        Self::with_parts(
            config.detection,
            Enhancer::new(&config.enhance),
            Box::new(ArtifactSegmenter::in_dir(
                EnergySegmenter,
                config.output.temp_dir.clone(),
            )),
        )
    }

    /// Build an extractor from explicit parts.
    pub fn with_parts(
        params: DetectionParams,
        enhancer: Enhancer,
        segmenter: Box<dyn Segmenter>,
    ) -> Self {
        Self {
            enhancer,
            segmenter,
            params,
        }
    }

    /// Extract the first activity region of `input` and write it to `output`.
    ///
    /// Fails with [`Error::NoActivityDetected`] when the segmenter finds
    /// nothing; no output file is written in that case.
    pub fn extract(&self, input: &Path, output: &Path) -> Result<Extraction> {
        let start_time = Instant::now();
        info!("Processing: {}", input.display());

        let original = decode_wav(input)?;
        debug!(
            "Decoded {:.2}s at {} Hz, {} ch, {}-bit",
            original.duration_secs(),
            original.sample_rate(),
            original.channels(),
            original.encoding().bits_per_sample
        );

        let enhanced = self.enhancer.enhance(&original, input)?;
        let regions = self.segmenter.segment(&enhanced, &self.params)?;
        debug!("Segmenter found {} region(s)", regions.len());

        let Some(region) = select_region(&regions) else {
            warn!("No audio activity detected in {}", input.display());
            return Err(Error::NoActivityDetected {
                path: input.to_path_buf(),
            });
        };

        let audio = original.time_slice(region.start_secs, region.end_secs)?;
        encode_wav(&audio, output)?;

        let elapsed_secs = start_time.elapsed().as_secs_f64();
        info!(
            "Saved {:.2}s ({:.2}s-{:.2}s) to {} in {elapsed_secs:.2}s",
            audio.duration_secs(),
            region.start_secs,
            region.end_secs,
            output.display()
        );

        Ok(Extraction {
            audio,
            region,
            region_count: regions.len(),
            output: output.to_path_buf(),
            elapsed_secs,
        })
    }
}
