//! End-to-end extraction on generated recordings.

#![allow(clippy::unwrap_used, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

mod common;

use common::{Part, entry_count, reference_recording, signal, write_int, write_mono_16};
use std::path::PathBuf;
use tempfile::TempDir;
use vadtrim::audio::{DenoiseError, Denoiser};
use vadtrim::config::Config;
use vadtrim::detection::{ArtifactSegmenter, DetectionParams, EnergySegmenter};
use vadtrim::error::ErrorKind;
use vadtrim::pipeline::{Enhancer, Extractor};

struct Passthrough;

impl Denoiser for Passthrough {
    fn denoise(&self, samples: &[f32], _: u32) -> Result<Vec<f32>, DenoiseError> {
        Ok(samples.to_vec())
    }
}

/// Config whose temp artifacts land in a directory the test can inspect.
fn config_with_temp(dir: &TempDir) -> (Config, PathBuf) {
    let temp = dir.path().join("artifacts");
    std::fs::create_dir(&temp).unwrap();
    let mut config = Config::default();
    config.output.temp_dir = Some(temp.clone());
    (config, temp)
}

#[test]
fn test_reference_recording_keeps_the_speech() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("ref.wav");
    let output = dir.path().join("ref_out.wav");
    write_mono_16(&input, &reference_recording(16000), 16000);
    let (config, temp) = config_with_temp(&dir);

    let extraction = Extractor::from_config(&config)
        .extract(&input, &output)
        .unwrap();

    assert_eq!(extraction.region_count, 1);
    assert!((extraction.region.start_secs - 2.0).abs() <= 0.1);
    assert!((extraction.region.end_secs - 7.0).abs() <= 0.1);

    let reader = hound::WavReader::open(&output).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, 16000);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    let secs = f64::from(reader.duration()) / 16000.0;
    assert!((secs - 5.0).abs() <= 0.2);

    assert_eq!(entry_count(&temp), 0);
}

#[test]
fn test_pure_silence_is_no_activity() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("quiet.wav");
    let output = dir.path().join("quiet_out.wav");
    write_mono_16(&input, &signal(16000, &[(2.0, Part::Silence)]), 16000);
    let (config, temp) = config_with_temp(&dir);

    let err = Extractor::from_config(&config)
        .extract(&input, &output)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NoActivity);
    assert!(err.is_no_activity());
    assert!(err.to_string().contains("quiet.wav"));
    assert!(!output.exists());
    assert_eq!(entry_count(&temp), 0);
}

#[test]
fn test_stereo_24_bit_slice_is_lossless() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("stereo.wav");
    let output = dir.path().join("stereo_out.wav");

    let rate = 8000;
    let left = signal(
        rate,
        &[(1.0, Part::Silence), (1.0, Part::Tone(0.6)), (1.0, Part::Silence)],
    );
    let interleaved: Vec<i32> = left
        .iter()
        .enumerate()
        .flat_map(|(i, &s)| {
            let l = (f64::from(s) * 8_388_607.0) as i32;
            // Distinct right channel so a channel swap would show
            let r = l / 3 + i32::try_from(i % 7).unwrap();
            [l, r]
        })
        .collect();
    write_int(&input, &interleaved, rate, 2, 24);
    let (config, _) = config_with_temp(&dir);

    let extraction = Extractor::from_config(&config)
        .extract(&input, &output)
        .unwrap();

    let mut reader = hound::WavReader::open(&output).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.bits_per_sample, 24);
    assert_eq!(spec.sample_rate, rate);

    let written: Vec<i32> = reader.samples::<i32>().map(Result::unwrap).collect();
    let start = (extraction.region.start_secs * f64::from(rate)).round() as usize;
    let end = (extraction.region.end_secs * f64::from(rate)).round() as usize;
    assert_eq!(written, interleaved[start * 2..end * 2].to_vec());
    assert!((extraction.region.start_secs - 1.0).abs() <= 0.1);
}

#[test]
fn test_earliest_region_wins() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("two.wav");
    let output = dir.path().join("two_out.wav");
    let samples = signal(
        16000,
        &[
            (1.0, Part::Silence),
            (0.6, Part::Tone(0.2)),
            (2.4, Part::Silence),
            (4.0, Part::Tone(0.9)),
            (2.0, Part::Silence),
        ],
    );
    write_mono_16(&input, &samples, 16000);
    let (config, _) = config_with_temp(&dir);

    let extraction = Extractor::from_config(&config)
        .extract(&input, &output)
        .unwrap();

    assert_eq!(extraction.region_count, 2);
    assert!((extraction.region.start_secs - 1.0).abs() <= 0.1);
    assert!(extraction.region.end_secs < 2.0);
}

#[test]
fn test_silence_free_input_is_kept_whole() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("tone.wav");
    let output = dir.path().join("tone_out.wav");
    write_mono_16(&input, &signal(16000, &[(3.0, Part::Tone(0.4))]), 16000);

    let extractor = Extractor::with_parts(
        DetectionParams::default(),
        Enhancer::with_denoiser(Box::new(Passthrough), 0.1),
        Box::new(ArtifactSegmenter::new(EnergySegmenter)),
    );
    let extraction = extractor.extract(&input, &output).unwrap();

    assert!(extraction.region.start_secs.abs() < 1e-9);
    assert!((extraction.audio.duration_secs() - 3.0).abs() < 1e-3);
}

#[test]
fn test_too_short_input_is_enhance_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("blip.wav");
    write_mono_16(&input, &signal(16000, &[(0.05, Part::Tone(0.5))]), 16000);
    let (config, _) = config_with_temp(&dir);

    let err = Extractor::from_config(&config)
        .extract(&input, &dir.path().join("blip_out.wav"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Enhance);
}
