//! Log-MMSE spectral noise suppression.
//!
//! Estimates the noise spectrum from the leading frames of a signal, then
//! applies a log-spectral amplitude MMSE gain per frequency bin with a
//! decision-directed a-priori SNR. The noise estimate keeps adapting on
//! frames the built-in VAD classifies as noise.

use crate::constants::denoise::{
    FRAME_SECS, MAX_POSTERIOR_SNR, MIN_EXPINT_ARG, MIN_NOISE_POWER, MIN_PRIOR_SNR_DB,
    NOISE_UPDATE_FACTOR, OVERLAP_PERCENT, PRIOR_SNR_SMOOTHING,
};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

/// Why a denoise pass could not run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DenoiseError {
    /// Not enough samples to estimate the noise floor.
    #[error("input has {samples} samples, need at least {required} to estimate noise")]
    TooShort {
        /// Samples provided.
        samples: usize,
        /// Samples required.
        required: usize,
    },

    /// Sample rate too low to form an analysis frame.
    #[error("sample rate {0} Hz is too low for noise suppression")]
    SampleRateTooLow(u32),

    /// Input contains NaN or infinite samples.
    #[error("input contains non-finite samples")]
    NonFinite,
}

/// Noise suppression over one channel of float samples in [-1.0, 1.0].
///
/// Implementations must return exactly as many samples as they receive and
/// must not change the sample rate.
pub trait Denoiser {
    /// Suppress stationary background noise.
    fn denoise(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>, DenoiseError>;
}

/// Log-MMSE short-time spectral amplitude estimator.
#[derive(Debug, Clone)]
pub struct LogMmseDenoiser {
    initial_noise_frames: usize,
    noise_threshold: f64,
}

impl LogMmseDenoiser {
    /// Create a denoiser.
    ///
    /// * `initial_noise_frames` - leading 20 ms frames assumed to be noise
    /// * `noise_threshold` - VAD level below which the noise estimate adapts
    pub fn new(initial_noise_frames: usize, noise_threshold: f64) -> Self {
        Self {
            initial_noise_frames: initial_noise_frames.max(1),
            noise_threshold,
        }
    }
}

impl Default for LogMmseDenoiser {
    fn default() -> Self {
        Self::new(
            crate::constants::denoise::DEFAULT_INITIAL_NOISE_FRAMES,
            crate::constants::denoise::DEFAULT_NOISE_THRESHOLD,
        )
    }
}

/// Analysis frame length in samples, rounded up to an even count.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn frame_length(sample_rate: u32) -> usize {
    let len = (FRAME_SECS * f64::from(sample_rate)).floor() as usize;
    if len % 2 == 1 { len + 1 } else { len }
}

/// Symmetric Hann window scaled so 50% overlap-add sums to unity.
#[allow(clippy::cast_precision_loss)]
fn synthesis_window(len: usize, hop: usize) -> Vec<f64> {
    let denom = (len - 1).max(1) as f64;
    let raw: Vec<f64> = (0..len)
        .map(|n| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * n as f64 / denom).cos())
        .collect();
    let sum: f64 = raw.iter().sum();
    let scale = if sum > 0.0 { hop as f64 / sum } else { 1.0 };
    raw.into_iter().map(|w| w * scale).collect()
}

/// Exponential integral `E1(x)` for `x > 0`.
#[allow(clippy::cast_precision_loss)]
fn exp_int_e1(x: f64) -> f64 {
    const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;
    const MAX_ITERATIONS: usize = 200;
    const TOLERANCE: f64 = 1e-15;

    if x <= 1.0 {
        // Power series
        let mut sum = 0.0;
        let mut term = 1.0;
        for k in 1..=MAX_ITERATIONS {
            let k = k as f64;
            term *= -x / k;
            let contribution = term / k;
            sum += contribution;
            if contribution.abs() < TOLERANCE * sum.abs().max(f64::MIN_POSITIVE) {
                break;
            }
        }
        -EULER_GAMMA - x.ln() - sum
    } else {
        // Continued fraction, modified Lentz
        let tiny = 1e-300;
        let mut b = x + 1.0;
        let mut c = 1.0 / tiny;
        let mut d = 1.0 / b;
        let mut h = d;
        for i in 1..=MAX_ITERATIONS {
            let an = -((i * i) as f64);
            b += 2.0;
            d = 1.0 / (an * d + b);
            c = b + an / c;
            let delta = c * d;
            h *= delta;
            if (delta - 1.0).abs() < TOLERANCE {
                break;
            }
        }
        h * (-x).exp()
    }
}

impl Denoiser for LogMmseDenoiser {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn denoise(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>, DenoiseError> {
        let frame_len = frame_length(sample_rate);
        if frame_len < 2 {
            return Err(DenoiseError::SampleRateTooLow(sample_rate));
        }
        if samples.iter().any(|s| !s.is_finite()) {
            return Err(DenoiseError::NonFinite);
        }

        let required = frame_len * self.initial_noise_frames;
        if samples.len() < required {
            return Err(DenoiseError::TooShort {
                samples: samples.len(),
                required,
            });
        }

        let overlap = frame_len * OVERLAP_PERCENT / 100;
        let hop = frame_len - overlap;
        let window = synthesis_window(frame_len, hop);
        let n_fft = 2 * frame_len;
        let inv_n_fft = 1.0 / n_fft as f64;

        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(n_fft);
        let inverse = planner.plan_fft_inverse(n_fft);

        let signal: Vec<f64> = samples.iter().map(|&s| f64::from(s)).collect();
        let mut spectrum = vec![Complex::new(0.0, 0.0); n_fft];

        let load_frame = |spectrum: &mut [Complex<f64>], start: usize| {
            for (i, bin) in spectrum.iter_mut().enumerate() {
                *bin = if i < frame_len {
                    Complex::new(signal[start + i] * window[i], 0.0)
                } else {
                    Complex::new(0.0, 0.0)
                };
            }
        };

        // Initial noise magnitude from the leading frames
        let mut noise_magnitude = vec![0.0; n_fft];
        for frame in 0..self.initial_noise_frames {
            load_frame(&mut spectrum, frame * frame_len);
            forward.process(&mut spectrum);
            for (acc, bin) in noise_magnitude.iter_mut().zip(&spectrum) {
                *acc += bin.norm();
            }
        }
        let frames_f = self.initial_noise_frames as f64;
        let mut noise_power: Vec<f64> = noise_magnitude
            .iter()
            .map(|m| (m / frames_f).powi(2).max(MIN_NOISE_POWER))
            .collect();

        let min_prior_snr = 10.0_f64.powf(MIN_PRIOR_SNR_DB / 10.0);
        let n_frames = (samples.len() / hop).saturating_sub(frame_len / hop);

        let mut output = vec![0.0_f32; samples.len()];
        let mut overlap_tail = vec![0.0; hop];
        let mut prev_clean_power = vec![0.0; n_fft];
        let mut power = vec![0.0; n_fft];
        let mut gains = vec![0.0; n_fft];

        for n in 0..n_frames {
            let start = n * hop;
            load_frame(&mut spectrum, start);
            forward.process(&mut spectrum);

            let mut vad_sum = 0.0;
            for i in 0..n_fft {
                power[i] = spectrum[i].norm_sqr();
                let posterior = (power[i] / noise_power[i]).min(MAX_POSTERIOR_SNR);
                let excess = (posterior - 1.0).max(0.0);
                let prior = if n == 0 {
                    PRIOR_SNR_SMOOTHING + (1.0 - PRIOR_SNR_SMOOTHING) * excess
                } else {
                    (PRIOR_SNR_SMOOTHING * prev_clean_power[i] / noise_power[i]
                        + (1.0 - PRIOR_SNR_SMOOTHING) * excess)
                        .max(min_prior_snr)
                };

                vad_sum += posterior * prior / (1.0 + prior) - (1.0 + prior).ln();

                let a = prior / (1.0 + prior);
                let v = (a * posterior).max(MIN_EXPINT_ARG);
                gains[i] = a * (0.5 * exp_int_e1(v)).exp();
                prev_clean_power[i] = power[i] * gains[i] * gains[i];
            }

            if vad_sum / (frame_len as f64) < self.noise_threshold {
                for (noise, &p) in noise_power.iter_mut().zip(&power) {
                    *noise = (NOISE_UPDATE_FACTOR * *noise + (1.0 - NOISE_UPDATE_FACTOR) * p)
                        .max(MIN_NOISE_POWER);
                }
            }

            for (bin, &gain) in spectrum.iter_mut().zip(&gains) {
                *bin *= gain;
            }
            inverse.process(&mut spectrum);

            for i in 0..hop {
                let value = overlap_tail[i] + spectrum[i].re * inv_n_fft;
                output[start + i] = value as f32;
                overlap_tail[i] = spectrum[overlap + i].re * inv_n_fft;
            }
        }

        if output.iter().any(|s| !s.is_finite()) {
            return Err(DenoiseError::NonFinite);
        }

        Ok(output)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]
mod tests {
    use super::*;

    /// Deterministic white noise in [-amplitude, amplitude].
    fn noise(len: usize, amplitude: f32, mut seed: u64) -> Vec<f32> {
        (0..len)
            .map(|_| {
                seed = seed
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                let unit = (seed >> 11) as f64 / (1_u64 << 53) as f64;
                ((unit * 2.0 - 1.0) as f32) * amplitude
            })
            .collect()
    }

    fn rms(samples: &[f32]) -> f64 {
        let sum: f64 = samples.iter().map(|&s| f64::from(s).powi(2)).sum();
        (sum / samples.len() as f64).sqrt()
    }

    #[test]
    fn test_exp_int_e1_reference_values() {
        assert!((exp_int_e1(0.1) - 1.822_923_958).abs() < 1e-8);
        assert!((exp_int_e1(1.0) - 0.219_383_934).abs() < 1e-8);
        assert!((exp_int_e1(2.0) - 0.048_900_511).abs() < 1e-8);
        assert!((exp_int_e1(10.0) - 4.156_968_929e-6).abs() < 1e-12);
    }

    #[test]
    fn test_frame_length_is_even() {
        assert_eq!(frame_length(16000), 320);
        assert_eq!(frame_length(22050), 442);
        assert_eq!(frame_length(8000), 160);
    }

    #[test]
    fn test_too_short_input_is_rejected() {
        let denoiser = LogMmseDenoiser::default();
        let err = denoiser.denoise(&[0.0; 100], 16000).unwrap_err();
        assert_eq!(
            err,
            DenoiseError::TooShort {
                samples: 100,
                required: 1920
            }
        );
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let denoiser = LogMmseDenoiser::default();
        let mut samples = vec![0.0; 4000];
        samples[10] = f32::NAN;
        assert_eq!(
            denoiser.denoise(&samples, 16000).unwrap_err(),
            DenoiseError::NonFinite
        );
    }

    #[test]
    fn test_digital_silence_stays_silent() {
        let denoiser = LogMmseDenoiser::default();
        let out = denoiser.denoise(&vec![0.0; 16000], 16000).unwrap();
        assert_eq!(out.len(), 16000);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_output_length_matches_input() {
        let denoiser = LogMmseDenoiser::default();
        let input = noise(12_345, 0.01, 7);
        let out = denoiser.denoise(&input, 16000).unwrap();
        assert_eq!(out.len(), input.len());
    }

    #[test]
    fn test_noise_suppressed_tone_kept() {
        let rate = 16000;
        let mut input = noise(rate as usize * 2, 0.01, 42);
        // Tone over the second half
        for (i, sample) in input.iter_mut().enumerate().skip(rate as usize) {
            let t = i as f32 / rate as f32;
            *sample += 0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin();
        }

        let out = LogMmseDenoiser::default().denoise(&input, rate).unwrap();

        let noise_in = rms(&input[4000..14000]);
        let noise_out = rms(&out[4000..14000]);
        assert!(noise_out < noise_in * 0.5, "noise {noise_in} -> {noise_out}");

        let tone_in = rms(&input[20000..30000]);
        let tone_out = rms(&out[20000..30000]);
        assert!(tone_out > tone_in * 0.7, "tone {tone_in} -> {tone_out}");
    }
}
