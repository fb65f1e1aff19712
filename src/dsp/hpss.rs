//! Harmonic/percussive source separation.
//!
//! Median filtering along time enhances sustained (harmonic) content while
//! median filtering along frequency enhances broadband transients. Soft
//! masks built from the two enhanced spectrograms split the signal into a
//! harmonic and a percussive component.

use crate::dsp::stft::{istft, stft, Stft};
use crate::error::DspError;

/// Exponent applied to the enhanced magnitudes when building masks
const MASK_POWER: f32 = 2.0;

/// Split `samples` into (harmonic, percussive) components of equal length.
///
/// `kernel` is the median-filter length used in both directions and `margin`
/// scales the competing component inside each mask; a margin above 1.0
/// trades separation sharpness for energy preservation.
pub fn hpss(
    samples: &[f32],
    n_fft: usize,
    hop_size: usize,
    kernel: usize,
    margin: f32,
) -> Result<(Vec<f32>, Vec<f32>), DspError> {
    let spectrogram = stft(samples, n_fft, hop_size)?;
    let mags = spectrogram.magnitudes();

    let harmonic_env = median_filter_time(&mags, kernel);
    let percussive_env = median_filter_freq(&mags, kernel);

    let n_frames = spectrogram.n_frames();
    let n_bins = spectrogram.n_bins();

    let mut harmonic_frames = Vec::with_capacity(n_frames);
    let mut percussive_frames = Vec::with_capacity(n_frames);

    for t in 0..n_frames {
        let mut h_frame = Vec::with_capacity(n_bins);
        let mut p_frame = Vec::with_capacity(n_bins);

        for b in 0..n_bins {
            let h = harmonic_env[t][b].powf(MASK_POWER);
            let p = percussive_env[t][b].powf(MASK_POWER);
            let h_ref = (margin * harmonic_env[t][b]).powf(MASK_POWER);
            let p_ref = (margin * percussive_env[t][b]).powf(MASK_POWER);

            let mask_h = h / (h + p_ref + 1e-10);
            let mask_p = p / (p + h_ref + 1e-10);

            h_frame.push(spectrogram.frames[t][b] * mask_h);
            p_frame.push(spectrogram.frames[t][b] * mask_p);
        }

        harmonic_frames.push(h_frame);
        percussive_frames.push(p_frame);
    }

    let harmonic_stft = Stft {
        frames: harmonic_frames,
        n_fft,
        hop_size,
    };
    let percussive_stft = Stft {
        frames: percussive_frames,
        n_fft,
        hop_size,
    };

    let harmonic = istft(&harmonic_stft, samples.len())?;
    let percussive = istft(&percussive_stft, samples.len())?;

    Ok((harmonic, percussive))
}

/// Median filter each frequency bin along the time axis.
fn median_filter_time(mags: &[Vec<f32>], kernel: usize) -> Vec<Vec<f32>> {
    let n_frames = mags.len();
    let n_bins = mags.first().map(Vec::len).unwrap_or(0);
    let half = kernel / 2;

    let mut out = vec![vec![0.0f32; n_bins]; n_frames];
    let mut scratch = Vec::with_capacity(kernel);

    for b in 0..n_bins {
        for t in 0..n_frames {
            let start = t.saturating_sub(half);
            let end = (t + half + 1).min(n_frames);

            scratch.clear();
            for frame in &mags[start..end] {
                scratch.push(frame[b]);
            }
            out[t][b] = median_of(&mut scratch);
        }
    }

    out
}

/// Median filter each frame along the frequency axis.
fn median_filter_freq(mags: &[Vec<f32>], kernel: usize) -> Vec<Vec<f32>> {
    let n_bins = mags.first().map(Vec::len).unwrap_or(0);
    let half = kernel / 2;

    let mut out = Vec::with_capacity(mags.len());
    let mut scratch = Vec::with_capacity(kernel);

    for frame in mags {
        let mut filtered = vec![0.0f32; n_bins];
        for b in 0..n_bins {
            let start = b.saturating_sub(half);
            let end = (b + half + 1).min(n_bins);

            scratch.clear();
            scratch.extend_from_slice(&frame[start..end]);
            filtered[b] = median_of(&mut scratch);
        }
        out.push(filtered);
    }

    out
}

fn median_of(window: &mut [f32]) -> f32 {
    if window.is_empty() {
        return 0.0;
    }
    window.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    window[window.len() / 2]
}
