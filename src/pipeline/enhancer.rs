//! Enhancement of a decoded recording for activity detection.

use crate::audio::{
    AudioBuffer, AudioMetadata, Denoiser, LogMmseDenoiser, peak_normalize, probe_metadata,
};
use crate::config::EnhanceConfig;
use crate::error::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Describe how the probed header disagrees with the decoded buffer, if it does.
///
/// Bit depth is only compared when the header declares one.
fn header_mismatch(metadata: &AudioMetadata, decoded: &AudioBuffer) -> Option<String> {
    if metadata.sample_rate != decoded.sample_rate() || metadata.channels != decoded.channels() {
        return Some(format!(
            "header declares {} Hz / {} ch, decoded {} Hz / {} ch",
            metadata.sample_rate,
            metadata.channels,
            decoded.sample_rate(),
            decoded.channels()
        ));
    }

    let decoded_bits = u32::from(decoded.encoding().bits_per_sample);
    match metadata.bits_per_sample {
        Some(bits) if bits != decoded_bits => Some(format!(
            "header declares {bits}-bit samples, decoded {decoded_bits}-bit"
        )),
        _ => None,
    }
}

/// Produces the denoised, mono, peak-normalized working copy of a recording.
///
/// The enhanced buffer only feeds segmentation; it is never written as output.
pub struct Enhancer {
    denoiser: Box<dyn Denoiser>,
    headroom_db: f64,
}

impl Enhancer {
    /// Build an enhancer backed by the log-MMSE denoiser.
    pub fn new(settings: &EnhanceConfig) -> Self {
        Self::with_denoiser(
            Box::new(LogMmseDenoiser::new(
                settings.initial_noise_frames,
                settings.noise_threshold,
            )),
            settings.headroom_db,
        )
    }

    /// Build an enhancer around any [`Denoiser`].
    pub fn with_denoiser(denoiser: Box<dyn Denoiser>, headroom_db: f64) -> Self {
        Self {
            denoiser,
            headroom_db,
        }
    }

    /// Enhance `original`, which was decoded from `source`.
    ///
    /// Rate, channel count and bit depth are re-read from the container
    /// header of `source` and must agree with the decoded buffer. The result is mono,
    /// at the original rate and sample encoding.
    pub fn enhance(&self, original: &AudioBuffer, source: &Path) -> Result<AudioBuffer> {
        let metadata = probe_metadata(source)?;
        if let Some(reason) = header_mismatch(&metadata, original) {
            return Err(Error::MetadataMismatch {
                path: source.to_path_buf(),
                reason,
            });
        }

        let rate = metadata.sample_rate;
        let enhance_error = |reason: String| Error::Enhance {
            path: source.to_path_buf(),
            reason,
        };

        let frames = original.frames();
        let mut mono = vec![0.0_f32; frames];
        for channel in 0..original.channels() {
            let denoised = self
                .denoiser
                .denoise(&original.channel_f32(channel), rate)
                .map_err(|e| enhance_error(e.to_string()))?;

            if denoised.len() != frames {
                return Err(enhance_error(format!(
                    "denoiser returned {} samples for {frames} input frames",
                    denoised.len()
                )));
            }
            if denoised.iter().any(|s| !s.is_finite()) {
                return Err(enhance_error("denoiser produced non-finite samples".to_string()));
            }

            for (acc, sample) in mono.iter_mut().zip(denoised) {
                *acc += sample;
            }
        }

        let channels = f32::from(original.channels());
        for sample in &mut mono {
            *sample /= channels;
        }

        let normalized = peak_normalize(&mono, self.headroom_db);
        debug!(
            "Enhanced {} ({} ch -> mono, {:.2}s)",
            source.display(),
            original.channels(),
            original.duration_secs()
        );

        AudioBuffer::from_mono_f32(&normalized, rate, original.encoding())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]
mod tests {
    use super::*;
    use crate::audio::{DenoiseError, SampleEncoding, Samples, decode_wav, encode_wav};
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    struct Passthrough;

    impl Denoiser for Passthrough {
        fn denoise(&self, samples: &[f32], _: u32) -> std::result::Result<Vec<f32>, DenoiseError> {
            Ok(samples.to_vec())
        }
    }

    struct Truncating;

    impl Denoiser for Truncating {
        fn denoise(&self, samples: &[f32], _: u32) -> std::result::Result<Vec<f32>, DenoiseError> {
            Ok(samples[..samples.len() / 2].to_vec())
        }
    }

    fn write_stereo(dir: &TempDir, frames: usize) -> (std::path::PathBuf, AudioBuffer) {
        let samples = (0..frames)
            .flat_map(|i| {
                let v = ((i as f32 * 0.05).sin() * 8000.0) as i32;
                [v, v / 2]
            })
            .collect();
        let buffer = AudioBuffer::new(Samples::Int(samples), 16000, 2, SampleEncoding::PCM_16).unwrap();
        let path = dir.path().join("stereo.wav");
        encode_wav(&buffer, &path).unwrap();
        let decoded = decode_wav(&path).unwrap();
        (path, decoded)
    }

    #[test]
    fn test_enhanced_is_mono_at_original_rate() {
        let dir = TempDir::new().unwrap();
        let (path, original) = write_stereo(&dir, 16000);
        let enhancer = Enhancer::new(&EnhanceConfig::default());

        let enhanced = enhancer.enhance(&original, &path).unwrap();
        assert_eq!(enhanced.channels(), 1);
        assert_eq!(enhanced.sample_rate(), 16000);
        assert_eq!(enhanced.encoding(), original.encoding());
        assert_eq!(enhanced.frames(), original.frames());
    }

    #[test]
    fn test_passthrough_is_normalized_average() {
        let dir = TempDir::new().unwrap();
        let (path, original) = write_stereo(&dir, 4000);
        let enhancer = Enhancer::with_denoiser(Box::new(Passthrough), 0.1);

        let enhanced = enhancer.enhance(&original, &path).unwrap();
        let peak = enhanced
            .to_mono_f32()
            .iter()
            .fold(0.0_f32, |acc, s| acc.max(s.abs()));
        assert!((peak - 0.9886).abs() < 1e-3);
    }

    #[test]
    fn test_original_is_untouched() {
        let dir = TempDir::new().unwrap();
        let (path, original) = write_stereo(&dir, 4000);
        let before = original.clone();
        let _ = Enhancer::with_denoiser(Box::new(Passthrough), 0.1)
            .enhance(&original, &path)
            .unwrap();
        assert_eq!(original, before);
    }

    #[test]
    fn test_too_short_is_enhance_error() {
        let dir = TempDir::new().unwrap();
        let (path, original) = write_stereo(&dir, 100);
        let err = Enhancer::new(&EnhanceConfig::default())
            .enhance(&original, &path)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Enhance);
        assert!(err.to_string().contains("stereo.wav"));
    }

    #[test]
    fn test_length_changing_denoiser_rejected() {
        let dir = TempDir::new().unwrap();
        let (path, original) = write_stereo(&dir, 4000);
        let err = Enhancer::with_denoiser(Box::new(Truncating), 0.1)
            .enhance(&original, &path)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Enhance);
    }

    #[test]
    fn test_header_mismatch_is_metadata_error() {
        let dir = TempDir::new().unwrap();
        let (path, _) = write_stereo(&dir, 4000);
        let other = AudioBuffer::from_mono_f32(&[0.0; 4000], 16000, SampleEncoding::PCM_16).unwrap();
        let err = Enhancer::with_denoiser(Box::new(Passthrough), 0.1)
            .enhance(&other, &path)
            .unwrap_err();
        assert!(matches!(err, Error::MetadataMismatch { .. }));
        assert_eq!(err.kind(), ErrorKind::Metadata);
    }

    #[test]
    fn test_bit_depth_mismatch_detected() {
        let decoded = AudioBuffer::from_mono_f32(&[0.0; 16], 16000, SampleEncoding::PCM_16).unwrap();
        let mut metadata = AudioMetadata {
            sample_rate: 16000,
            channels: 1,
            bits_per_sample: Some(16),
        };
        assert_eq!(header_mismatch(&metadata, &decoded), None);

        metadata.bits_per_sample = None;
        assert_eq!(header_mismatch(&metadata, &decoded), None);

        metadata.bits_per_sample = Some(24);
        let reason = header_mismatch(&metadata, &decoded).unwrap();
        assert!(reason.contains("24-bit"));
    }

    #[test]
    fn test_header_agrees_for_24_bit_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deep.wav");
        let encoding = SampleEncoding {
            bits_per_sample: 24,
            format: crate::audio::SampleFormat::Int,
        };
        let samples: Vec<f32> = (0..4000).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let buffer = AudioBuffer::from_mono_f32(&samples, 16000, encoding).unwrap();
        encode_wav(&buffer, &path).unwrap();
        let decoded = decode_wav(&path).unwrap();

        let metadata = probe_metadata(&path).unwrap();
        assert_eq!(header_mismatch(&metadata, &decoded), None);
        assert!(
            Enhancer::with_denoiser(Box::new(Passthrough), 0.1)
                .enhance(&decoded, &path)
                .is_ok()
        );
    }

    #[test]
    fn test_missing_source_is_metadata_error() {
        let dir = TempDir::new().unwrap();
        let original = AudioBuffer::from_mono_f32(&[0.0; 4000], 16000, SampleEncoding::PCM_16).unwrap();
        let err = Enhancer::new(&EnhanceConfig::default())
            .enhance(&original, &dir.path().join("gone.wav"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Metadata);
    }
}
