//! Frame-energy activity tokenizer.

use super::{ActivityRegion, DetectionParams, Segmenter};
use crate::audio::AudioBuffer;
use crate::constants::detection::ENERGY_FULL_SCALE;
use crate::error::Result;
use tracing::trace;

/// Slack applied when converting second-based limits to frame counts.
const FRAME_EPSILON: f64 = 1e-9;

/// Segments audio by thresholding per-frame energy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergySegmenter;

/// Energy of a frame in dB, measured on the 16-bit scale.
///
/// Returns negative infinity for an empty or all-zero frame.
pub fn frame_energy_db(frame: &[f32]) -> f64 {
    if frame.is_empty() {
        return f64::NEG_INFINITY;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean_square = frame
        .iter()
        .map(|&s| (f64::from(s) * ENERGY_FULL_SCALE).powi(2))
        .sum::<f64>()
        / frame.len() as f64;

    if mean_square > 0.0 {
        10.0 * mean_square.log10()
    } else {
        f64::NEG_INFINITY
    }
}

/// Frame-count limits derived from [`DetectionParams`].
#[derive(Debug, Clone, Copy)]
struct FrameLimits {
    min_frames: usize,
    max_frames: usize,
    max_silence_frames: usize,
    drop_trailing_silence: bool,
}

impl FrameLimits {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn new(params: &DetectionParams, window_secs: f64) -> Self {
        let min_frames = (params.min_duration / window_secs - FRAME_EPSILON).ceil().max(1.0);
        let max_frames = (params.max_duration / window_secs + FRAME_EPSILON).floor().max(1.0);
        let max_silence = (params.max_silence / window_secs + FRAME_EPSILON).floor().max(0.0);
        Self {
            min_frames: min_frames as usize,
            max_frames: max_frames as usize,
            max_silence_frames: max_silence as usize,
            drop_trailing_silence: params.drop_trailing_silence,
        }
    }

    /// Close a token, returning its frame span if it is long enough.
    fn finish(&self, token: OpenToken) -> Option<(usize, usize)> {
        let end = if self.drop_trailing_silence {
            token.active_end
        } else {
            token.active_end + token.silence_run.min(self.max_silence_frames)
        };
        (end - token.start >= self.min_frames).then_some((token.start, end))
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenToken {
    start: usize,
    /// One past the last active frame.
    active_end: usize,
    silence_run: usize,
}

/// Group per-frame activity flags into `[start, end)` frame spans.
fn tokenize(active: &[bool], limits: &FrameLimits) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut current: Option<OpenToken> = None;

    for (index, &is_active) in active.iter().enumerate() {
        let token = match current {
            None if is_active => OpenToken {
                start: index,
                active_end: index + 1,
                silence_run: 0,
            },
            None => continue,
            Some(mut token) => {
                if is_active {
                    token.active_end = index + 1;
                    token.silence_run = 0;
                } else {
                    token.silence_run += 1;
                    if token.silence_run > limits.max_silence_frames {
                        spans.extend(limits.finish(token));
                        current = None;
                        continue;
                    }
                }
                token
            }
        };

        if index + 1 - token.start >= limits.max_frames {
            spans.extend(limits.finish(token));
            current = None;
        } else {
            current = Some(token);
        }
    }

    if let Some(token) = current {
        spans.extend(limits.finish(token));
    }

    spans
}

impl Segmenter for EnergySegmenter {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn segment(
        &self,
        audio: &AudioBuffer,
        params: &DetectionParams,
    ) -> Result<Vec<ActivityRegion>> {
        let rate = f64::from(audio.sample_rate());
        let window = ((params.analysis_window * rate).round() as usize).max(1);
        let window_secs = window as f64 / rate;
        let duration = audio.duration_secs();

        let samples = audio.to_mono_f32();
        let active: Vec<bool> = samples
            .chunks(window)
            .map(|frame| frame_energy_db(frame) >= params.energy_threshold)
            .collect();

        let limits = FrameLimits::new(params, window_secs);
        trace!(
            "Segmenting {} frames of {window} samples ({} active)",
            active.len(),
            active.iter().filter(|&&a| a).count()
        );

        Ok(tokenize(&active, &limits)
            .into_iter()
            .map(|(start, end)| ActivityRegion {
                start_secs: start as f64 * window_secs,
                end_secs: (end as f64 * window_secs).min(duration),
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
mod tests {
    use super::*;
    use crate::audio::SampleEncoding;
    use crate::detection::select_region;

    const RATE: u32 = 16000;

    /// Piecewise signal: `(start, end, amplitude)` tone spans over silence.
    fn signal(total_secs: f64, spans: &[(f64, f64, f32)]) -> AudioBuffer {
        let len = (total_secs * f64::from(RATE)) as usize;
        let mut samples = vec![0.0_f32; len];
        for &(start, end, amplitude) in spans {
            let from = (start * f64::from(RATE)) as usize;
            let to = ((end * f64::from(RATE)) as usize).min(len);
            for (i, sample) in samples.iter_mut().enumerate().take(to).skip(from) {
                let t = i as f32 / RATE as f32;
                *sample = amplitude * (2.0 * std::f32::consts::PI * 440.0 * t).sin();
            }
        }
        AudioBuffer::from_mono_f32(&samples, RATE, SampleEncoding::PCM_16).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn limits(max: usize, silence: usize, min: usize, drop: bool) -> FrameLimits {
        FrameLimits {
            min_frames: min,
            max_frames: max,
            max_silence_frames: silence,
            drop_trailing_silence: drop,
        }
    }

    #[test]
    fn test_frame_energy_db() {
        assert_eq!(frame_energy_db(&[0.0; 10]), f64::NEG_INFINITY);
        assert_eq!(frame_energy_db(&[]), f64::NEG_INFINITY);
        let full = frame_energy_db(&[1.0, -1.0, 1.0, -1.0]);
        assert!((full - 90.309).abs() < 1e-3);
    }

    #[test]
    fn test_frame_limits_tolerate_float_error() {
        let frames = FrameLimits::new(&DetectionParams::default(), 0.05);
        assert_eq!(frames.max_silence_frames, 30);
        assert_eq!(frames.min_frames, 4);
        assert_eq!(frames.max_frames, 600);
    }

    #[test]
    fn test_tokenize_bridges_short_gap() {
        let active = [false, true, true, false, false, true, false];
        let spans = tokenize(&active, &limits(100, 2, 1, true));
        assert_eq!(spans, vec![(1, 6)]);
    }

    #[test]
    fn test_tokenize_splits_long_gap() {
        let active = [true, false, false, false, true];
        let spans = tokenize(&active, &limits(100, 2, 1, true));
        assert_eq!(spans, vec![(0, 1), (4, 5)]);
    }

    #[test]
    fn test_tokenize_keeps_trailing_silence_when_asked() {
        let active = [true, true, false, false, false, false];
        assert_eq!(tokenize(&active, &limits(100, 2, 1, false)), vec![(0, 4)]);
        assert_eq!(tokenize(&active, &limits(100, 2, 1, true)), vec![(0, 2)]);
    }

    #[test]
    fn test_tokenize_forces_split_at_max_length() {
        let active = [true; 7];
        let spans = tokenize(&active, &limits(3, 1, 1, true));
        assert_eq!(spans, vec![(0, 3), (3, 6), (6, 7)]);
    }

    #[test]
    fn test_tokenize_drops_short_tokens() {
        let active = [true, false, false, false, true, true, true];
        let spans = tokenize(&active, &limits(100, 1, 2, true));
        assert_eq!(spans, vec![(4, 7)]);
    }

    #[test]
    fn test_silence_free_input_covers_everything() {
        let audio = signal(3.0, &[(0.0, 3.0, 0.5)]);
        let regions = EnergySegmenter
            .segment(&audio, &DetectionParams::default())
            .unwrap();
        assert_eq!(regions.len(), 1);
        assert!(approx(regions[0].start_secs, 0.0));
        assert!(approx(regions[0].end_secs, 3.0));
    }

    #[test]
    fn test_pure_silence_yields_nothing() {
        let audio = signal(2.0, &[]);
        let regions = EnergySegmenter
            .segment(&audio, &DetectionParams::default())
            .unwrap();
        assert!(regions.is_empty());
    }

    #[test]
    fn test_gap_within_max_silence_is_bridged() {
        let audio = signal(5.0, &[(0.5, 1.5, 0.5), (2.5, 3.5, 0.5)]);
        let regions = EnergySegmenter
            .segment(&audio, &DetectionParams::default())
            .unwrap();
        assert_eq!(regions.len(), 1);
        assert!(approx(regions[0].start_secs, 0.5));
        assert!(approx(regions[0].end_secs, 3.5));
    }

    #[test]
    fn test_gap_beyond_max_silence_splits() {
        let audio = signal(6.0, &[(0.5, 1.5, 0.5), (3.5, 4.5, 0.5)]);
        let regions = EnergySegmenter
            .segment(&audio, &DetectionParams::default())
            .unwrap();
        assert_eq!(regions.len(), 2);
        assert!(approx(regions[1].start_secs, 3.5));
    }

    #[test]
    fn test_max_duration_forces_split() {
        let audio = signal(5.0, &[(0.0, 5.0, 0.5)]);
        let params = DetectionParams {
            max_duration: 2.0,
            ..DetectionParams::default()
        };
        let regions = EnergySegmenter.segment(&audio, &params).unwrap();
        let bounds: Vec<(f64, f64)> = regions.iter().map(|r| (r.start_secs, r.end_secs)).collect();
        assert_eq!(bounds.len(), 3);
        assert!(approx(bounds[1].0, 2.0) && approx(bounds[1].1, 4.0));
        assert!(approx(bounds[2].1, 5.0));
    }

    #[test]
    fn test_trailing_silence_forwarded_verbatim() {
        let audio = signal(5.0, &[(1.0, 2.0, 0.5)]);
        let keep = DetectionParams {
            drop_trailing_silence: false,
            ..DetectionParams::default()
        };
        let regions = EnergySegmenter.segment(&audio, &keep).unwrap();
        assert!(approx(regions[0].end_secs, 3.5));

        let regions = EnergySegmenter
            .segment(&audio, &DetectionParams::default())
            .unwrap();
        assert!(approx(regions[0].end_secs, 2.0));
    }

    #[test]
    fn test_threshold_separates_quiet_tone() {
        // 0.001 amplitude tone sits near 27 dB on the 16-bit scale
        let audio = signal(2.0, &[(0.0, 2.0, 0.001)]);
        let regions = EnergySegmenter
            .segment(&audio, &DetectionParams::default())
            .unwrap();
        assert!(regions.is_empty());

        let loose = DetectionParams {
            energy_threshold: 20.0,
            ..DetectionParams::default()
        };
        assert_eq!(EnergySegmenter.segment(&audio, &loose).unwrap().len(), 1);
    }

    #[test]
    fn test_quiet_tone_detected_after_normalization() {
        let quiet = signal(2.0, &[(0.0, 2.0, 0.001)]).to_mono_f32();
        let lifted = crate::audio::peak_normalize(&quiet, 0.1);
        let audio = AudioBuffer::from_mono_f32(&lifted, RATE, SampleEncoding::PCM_16).unwrap();
        let regions = EnergySegmenter
            .segment(&audio, &DetectionParams::default())
            .unwrap();
        assert_eq!(regions.len(), 1);
        assert!(approx(regions[0].start_secs, 0.0));
    }

    #[test]
    fn test_earliest_region_wins_over_longer_louder() {
        let audio = signal(10.0, &[(1.0, 1.5, 0.2), (4.0, 8.0, 0.9)]);
        let regions = EnergySegmenter
            .segment(&audio, &DetectionParams::default())
            .unwrap();
        assert_eq!(regions.len(), 2);

        let selected = select_region(&regions).unwrap();
        assert!(approx(selected.start_secs, 1.0));
        assert!(approx(selected.end_secs, 1.5));
    }
}
