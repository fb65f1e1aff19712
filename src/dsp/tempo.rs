//! Tempo estimation from the onset strength envelope.
//!
//! Autocorrelation of the envelope scores candidate beat periods inside the
//! configured BPM range; a log-normal prior centered on `start_bpm` breaks
//! ties between metrical levels (octave errors score similar correlations).

/// Width of the tempo prior in octaves
const PRIOR_STD_OCTAVES: f32 = 1.0;

/// Estimate tempo candidates from an onset envelope, strongest first.
///
/// Returns an empty vector when the envelope is too short or carries no
/// periodicity worth scoring; callers fall back to interval statistics.
pub fn estimate(
    envelope: &[f32],
    sample_rate: u32,
    hop_size: usize,
    min_bpm: f32,
    max_bpm: f32,
    start_bpm: f32,
) -> Vec<f32> {
    if envelope.len() < 2 {
        return Vec::new();
    }

    let frames_per_sec = sample_rate as f32 / hop_size as f32;
    let min_lag = ((frames_per_sec * 60.0 / max_bpm).ceil() as usize).max(1);
    let max_lag = ((frames_per_sec * 60.0 / min_bpm).floor() as usize).min(envelope.len() - 1);
    if min_lag > max_lag {
        return Vec::new();
    }

    let mut best_lag = 0usize;
    let mut best_score = 0.0f32;

    for lag in min_lag..=max_lag {
        let mut score = 0.0f32;
        for i in 0..(envelope.len() - lag) {
            score += envelope[i] * envelope[i + lag];
        }

        let bpm = 60.0 * frames_per_sec / lag as f32;
        let octaves = (bpm.log2() - start_bpm.log2()) / PRIOR_STD_OCTAVES;
        let weighted = score * (-0.5 * octaves * octaves).exp();

        if weighted > best_score {
            best_score = weighted;
            best_lag = lag;
        }
    }

    if best_lag == 0 || best_score <= 0.0 {
        return Vec::new();
    }

    vec![60.0 * frames_per_sec / best_lag as f32]
}

/// Pick the first usable BPM from an estimator's candidate list.
pub fn normalize_bpm(candidates: &[f32]) -> Option<u32> {
    candidates
        .iter()
        .copied()
        .find(|b| b.is_finite() && *b > 0.0)
        .map(|b| b.round() as u32)
        .filter(|&b| b > 0)
}

/// Estimate BPM from beat spacing when direct estimation yields nothing.
///
/// Uses the median interval of the first beats (at most 20); with fewer than
/// four beats or a degenerate median the `default_bpm` is returned.
pub fn fallback_from_beats(beats: &[f64], default_bpm: u32) -> u32 {
    let head = &beats[..beats.len().min(20)];
    if head.len() < 4 {
        return default_bpm;
    }

    let mut intervals: Vec<f64> = head.windows(2).map(|pair| pair[1] - pair[0]).collect();
    intervals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = intervals.len() / 2;
    let median = if intervals.len() % 2 == 0 {
        (intervals[mid - 1] + intervals[mid]) / 2.0
    } else {
        intervals[mid]
    };

    if median > 0.0 {
        let bpm = (60.0 / median).round();
        if bpm >= 1.0 {
            return bpm as u32;
        }
    }

    default_bpm
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impulse_envelope(period_frames: usize, n_frames: usize) -> Vec<f32> {
        let mut env = vec![0.0f32; n_frames];
        let mut i = 0;
        while i < n_frames {
            env[i] = 1.0;
            i += period_frames;
        }
        env
    }

    #[test]
    fn test_periodic_envelope_estimates_near_truth() {
        // Impulses every 21 frames at 22050/512 fps is about 123 BPM.
        let env = impulse_envelope(21, 430);
        let candidates = estimate(&env, 22050, 512, 30.0, 300.0, 120.0);

        assert_eq!(candidates.len(), 1);
        assert!(
            (115.0..=131.0).contains(&candidates[0]),
            "estimated {} BPM",
            candidates[0]
        );
    }

    #[test]
    fn test_silent_envelope_has_no_candidates() {
        let env = vec![0.0f32; 200];
        assert!(estimate(&env, 22050, 512, 30.0, 300.0, 120.0).is_empty());
    }

    #[test]
    fn test_short_envelope_has_no_candidates() {
        assert!(estimate(&[1.0], 22050, 512, 30.0, 300.0, 120.0).is_empty());
    }

    #[test]
    fn test_normalize_bpm_takes_first_usable() {
        assert_eq!(normalize_bpm(&[]), None);
        assert_eq!(normalize_bpm(&[f32::NAN, 128.4]), Some(128));
        assert_eq!(normalize_bpm(&[-5.0, 90.0]), Some(90));
    }

    #[test]
    fn test_fallback_uses_median_interval() {
        let beats = vec![0.0, 0.5, 1.0, 1.5, 2.0];
        assert_eq!(fallback_from_beats(&beats, 120), 120);

        let uneven = vec![0.0, 0.4, 0.9, 1.3, 1.8];
        // Intervals 0.4/0.5/0.4/0.5, median 0.45
        assert_eq!(fallback_from_beats(&uneven, 120), 133);
    }

    #[test]
    fn test_fallback_needs_four_beats() {
        assert_eq!(fallback_from_beats(&[0.0, 0.3, 0.9], 120), 120);
        assert_eq!(fallback_from_beats(&[], 120), 120);
    }
}
