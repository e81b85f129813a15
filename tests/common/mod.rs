//! Shared WAV fixtures for integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;

/// What a stretch of a fixture contains.
#[derive(Debug, Clone, Copy)]
pub enum Part {
    /// Digital silence.
    Silence,
    /// Low-level pseudo-random noise with the given peak amplitude.
    Noise(f32),
    /// 440 Hz tone with the given amplitude.
    Tone(f32),
}

/// Build a mono signal from `(duration_secs, part)` pieces.
pub fn signal(rate: u32, parts: &[(f64, Part)]) -> Vec<f32> {
    let mut samples = Vec::new();
    let mut state: u32 = 0x1234_5678;
    for &(secs, part) in parts {
        let count = (secs * f64::from(rate)).round() as usize;
        for _ in 0..count {
            let i = samples.len();
            let value = match part {
                Part::Silence => 0.0,
                Part::Noise(amplitude) => {
                    // xorshift32
                    state ^= state << 13;
                    state ^= state >> 17;
                    state ^= state << 5;
                    let unit = state as f32 / u32::MAX as f32;
                    amplitude * (2.0 * unit - 1.0)
                }
                Part::Tone(amplitude) => {
                    let t = i as f32 / rate as f32;
                    amplitude * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
                }
            };
            samples.push(value);
        }
    }
    samples
}

/// Write mono 16-bit PCM.
pub fn write_mono_16(path: &Path, samples: &[f32], rate: u32) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer
            .write_sample((s * 32767.0).round().clamp(-32768.0, 32767.0) as i16)
            .unwrap();
    }
    writer.finalize().unwrap();
}

/// Write interleaved integer samples with an arbitrary layout.
pub fn write_int(path: &Path, samples: &[i32], rate: u32, channels: u16, bits: u16) {
    let spec = WavSpec {
        channels,
        sample_rate: rate,
        bits_per_sample: bits,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

/// The 10 s reference recording: noise, 5 s of tone, noise.
pub fn reference_recording(rate: u32) -> Vec<f32> {
    signal(
        rate,
        &[
            (2.0, Part::Noise(0.001)),
            (5.0, Part::Tone(0.5)),
            (3.0, Part::Noise(0.001)),
        ],
    )
}

/// A short recording with one burst of tone.
pub fn short_voice(rate: u32) -> Vec<f32> {
    signal(
        rate,
        &[
            (0.5, Part::Noise(0.001)),
            (2.0, Part::Tone(0.5)),
            (0.5, Part::Noise(0.001)),
        ],
    )
}

/// Number of entries in a directory.
pub fn entry_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
