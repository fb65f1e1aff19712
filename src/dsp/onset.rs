//! Onset detection from spectral flux.
//!
//! The onset strength envelope is the half-wave-rectified frame-to-frame
//! increase in STFT magnitude. Peaks in the normalized envelope become onset
//! times, which are then thinned so no two onsets fall closer than a minimum
//! interval.

use crate::dsp::stft::stft;
use crate::error::DspError;

/// Threshold above the local mean for a peak to count as an onset
const PEAK_DELTA: f32 = 0.07;
/// Horizon of the local-maximum test, in seconds
const MAX_WINDOW_SECS: f32 = 0.03;
/// Horizon of the local-mean test, in seconds
const AVG_WINDOW_SECS: f32 = 0.10;
/// Minimum spacing between picked peaks, in seconds
const WAIT_SECS: f32 = 0.03;

/// Onset strength envelope of `samples`, one value per STFT frame.
pub fn onset_strength(
    samples: &[f32],
    n_fft: usize,
    hop_size: usize,
) -> Result<Vec<f32>, DspError> {
    let mags = stft(samples, n_fft, hop_size)?.magnitudes();

    let mut envelope = vec![0.0f32; mags.len()];
    for t in 1..mags.len() {
        envelope[t] = mags[t]
            .iter()
            .zip(mags[t - 1].iter())
            .map(|(&curr, &prev)| (curr - prev).max(0.0))
            .sum();
    }

    Ok(envelope)
}

/// Detect onset times in `samples`, in seconds.
///
/// Returns an ascending list with consecutive onsets at least `min_interval`
/// seconds apart, each rounded to millisecond precision. A signal with no
/// usable peaks yields an empty list.
pub fn detect_onsets(
    samples: &[f32],
    sample_rate: u32,
    n_fft: usize,
    hop_size: usize,
    min_interval: f64,
) -> Result<Vec<f64>, DspError> {
    let envelope = onset_strength(samples, n_fft, hop_size)?;
    let peaks = pick_envelope_peaks(&envelope, sample_rate, hop_size);
    let times = frames_to_time(&peaks, sample_rate, hop_size);

    Ok(min_interval_filter(&times, min_interval)
        .into_iter()
        .map(round_ms)
        .collect())
}

/// Peak frame indices of a normalized onset envelope.
fn pick_envelope_peaks(envelope: &[f32], sample_rate: u32, hop_size: usize) -> Vec<usize> {
    let max = envelope.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let min = envelope.iter().copied().fold(f32::INFINITY, f32::min);
    if envelope.is_empty() || max - min <= 1e-10 {
        return Vec::new();
    }

    let normalized: Vec<f32> = envelope.iter().map(|&v| (v - min) / (max - min)).collect();

    let frames_per_sec = sample_rate as f32 / hop_size as f32;
    let pre_max = (MAX_WINDOW_SECS * frames_per_sec) as usize;
    let pre_avg = (AVG_WINDOW_SECS * frames_per_sec) as usize;
    let wait = (WAIT_SECS * frames_per_sec) as usize;

    peak_pick(&normalized, pre_max, 0, pre_avg, pre_avg, PEAK_DELTA, wait)
}

/// Pick peaks from a signal with local-max, threshold and spacing rules.
///
/// An index qualifies when it is the maximum of `[i - pre_max, i + post_max]`,
/// exceeds the mean of `[i - pre_avg, i + post_avg]` by `delta`, and lies more
/// than `wait` indices after the previous pick. Windows are clamped at the
/// signal edges.
pub fn peak_pick(
    x: &[f32],
    pre_max: usize,
    post_max: usize,
    pre_avg: usize,
    post_avg: usize,
    delta: f32,
    wait: usize,
) -> Vec<usize> {
    let mut peaks = Vec::new();
    let mut last_peak: Option<usize> = None;

    for i in 0..x.len() {
        if let Some(last) = last_peak {
            if i - last <= wait {
                continue;
            }
        }

        let start_max = i.saturating_sub(pre_max);
        let end_max = (i + post_max + 1).min(x.len());
        if x[start_max..end_max].iter().any(|&v| v > x[i]) {
            continue;
        }

        let start_avg = i.saturating_sub(pre_avg);
        let end_avg = (i + post_avg + 1).min(x.len());
        let window = &x[start_avg..end_avg];
        let mean = window.iter().sum::<f32>() / window.len() as f32;

        if x[i] >= mean + delta {
            peaks.push(i);
            last_peak = Some(i);
        }
    }

    peaks
}

/// Convert frame indices to seconds.
pub fn frames_to_time(frames: &[usize], sample_rate: u32, hop_size: usize) -> Vec<f64> {
    frames
        .iter()
        .map(|&f| (f * hop_size) as f64 / sample_rate as f64)
        .collect()
}

/// Greedy minimum-interval thinning: keep the first time, then each time at
/// least `min_interval` after the last kept one.
pub fn min_interval_filter(times: &[f64], min_interval: f64) -> Vec<f64> {
    let mut filtered: Vec<f64> = Vec::with_capacity(times.len());

    for &t in times {
        match filtered.last() {
            Some(&last) if t - last < min_interval => {}
            _ => filtered.push(t),
        }
    }

    filtered
}

fn round_ms(t: f64) -> f64 {
    (t * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click_train(sample_rate: u32, spacing_secs: f32, duration_secs: f32) -> Vec<f32> {
        let len = (sample_rate as f32 * duration_secs) as usize;
        let spacing = (sample_rate as f32 * spacing_secs) as usize;
        let mut samples = vec![0.0f32; len];
        let mut i = 0;
        while i < len {
            samples[i] = 1.0;
            i += spacing;
        }
        samples
    }

    #[test]
    fn test_min_interval_filter_keeps_spaced_onsets() {
        let times = vec![0.0, 0.05, 0.2, 0.25, 0.4];
        assert_eq!(min_interval_filter(&times, 0.15), vec![0.0, 0.2, 0.4]);
    }

    #[test]
    fn test_min_interval_filter_empty() {
        assert!(min_interval_filter(&[], 0.15).is_empty());
    }

    #[test]
    fn test_frames_to_time() {
        let times = frames_to_time(&[0, 43], 22050, 512);
        assert_eq!(times[0], 0.0);
        assert!((times[1] - 43.0 * 512.0 / 22050.0).abs() < 1e-12);
    }

    #[test]
    fn test_peak_pick_isolated_peaks() {
        let x = vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.8, 0.0];
        let peaks = peak_pick(&x, 1, 0, 2, 2, 0.07, 1);
        assert_eq!(peaks, vec![2, 6]);
    }

    #[test]
    fn test_peak_pick_respects_wait() {
        let x = vec![0.0, 1.0, 0.9, 1.0, 0.0];
        let peaks = peak_pick(&x, 1, 0, 2, 2, 0.07, 3);
        assert_eq!(peaks, vec![1]);
    }

    #[test]
    fn test_detect_onsets_on_click_train() {
        let samples = click_train(22050, 0.5, 5.0);
        let onsets = detect_onsets(&samples, 22050, 2048, 512, 0.1).unwrap();

        assert!(
            (8..=12).contains(&onsets.len()),
            "unexpected onset count: {}",
            onsets.len()
        );

        for pair in onsets.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!(pair[1] - pair[0] >= 0.1 - 1e-3);
        }

        // Every onset should sit near a click position.
        for &t in &onsets {
            let nearest = (t / 0.5).round() * 0.5;
            assert!((t - nearest).abs() < 0.06, "onset {t} far from any click");
        }
    }

    #[test]
    fn test_silence_has_no_onsets() {
        let samples = vec![0.0f32; 22050];
        let onsets = detect_onsets(&samples, 22050, 2048, 512, 0.1).unwrap();
        assert!(onsets.is_empty());
    }

    #[test]
    fn test_onsets_are_millisecond_rounded() {
        let samples = click_train(22050, 0.5, 3.0);
        let onsets = detect_onsets(&samples, 22050, 2048, 512, 0.1).unwrap();

        assert!(!onsets.is_empty());
        for &t in &onsets {
            assert!(((t * 1000.0).round() - t * 1000.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_onset_strength_flags_click() {
        let mut samples = vec![0.0f32; 8192];
        samples[4096] = 1.0;
        let envelope = onset_strength(&samples, 2048, 512).unwrap();

        let peak_frame = envelope
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();

        // 4096 / 512 = frame 8
        assert!((peak_frame as isize - 8).abs() <= 1);
    }
}
