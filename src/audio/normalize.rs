//! Peak amplitude normalization.

/// Scale samples so the largest magnitude sits `headroom_db` below full scale.
///
/// Silent input (peak of zero) is returned unchanged.
#[allow(clippy::cast_possible_truncation)]
pub fn peak_normalize(samples: &[f32], headroom_db: f64) -> Vec<f32> {
    let peak = samples.iter().fold(0.0_f32, |acc, &s| acc.max(s.abs()));
    if peak <= 0.0 || !peak.is_finite() {
        return samples.to_vec();
    }

    let target = 10.0_f64.powf(-headroom_db / 20.0);
    let gain = (target / f64::from(peak)) as f32;
    samples.iter().map(|&s| s * gain).collect()
}
