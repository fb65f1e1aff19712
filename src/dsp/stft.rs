//! Short-time Fourier transform and its inverse.
//!
//! Frames are stored row-major (one `Vec` per frame) so that masking and
//! per-frame statistics stay cache-friendly without pulling in a matrix
//! library.

use realfft::RealFftPlanner;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::DspError;

/// Complex spectrogram produced by [`stft`].
#[derive(Debug, Clone)]
pub struct Stft {
    /// One spectrum per frame, each `n_fft / 2 + 1` bins long
    pub frames: Vec<Vec<Complex<f32>>>,
    /// FFT window size used for analysis
    pub n_fft: usize,
    /// Hop between consecutive frames in samples
    pub hop_size: usize,
}

impl Stft {
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn n_bins(&self) -> usize {
        self.frames.first().map(Vec::len).unwrap_or(0)
    }

    /// Magnitude spectrogram with the same frame-major layout
    pub fn magnitudes(&self) -> Vec<Vec<f32>> {
        self.frames
            .iter()
            .map(|frame| frame.iter().map(|c| c.norm()).collect())
            .collect()
    }
}

/// Periodic Hann window of length `n`.
pub fn hann_window(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / n as f32).cos())
        .collect()
}

/// Compute a centered STFT of `samples`.
///
/// The signal is zero-padded by `n_fft / 2` on both sides so frame `t` is
/// centered on sample `t * hop_size`, matching the frame-to-time conversion
/// used everywhere else in the pipeline.
pub fn stft(samples: &[f32], n_fft: usize, hop_size: usize) -> Result<Stft, DspError> {
    if n_fft == 0 || hop_size == 0 {
        return Err(DspError::TransformFailed {
            reason: "window and hop sizes must be positive".to_string(),
        });
    }

    let window = hann_window(n_fft);

    // Center padding keeps onset frames aligned with their sample positions.
    let pad = n_fft / 2;
    let mut padded = vec![0.0f32; samples.len() + 2 * pad];
    padded[pad..pad + samples.len()].copy_from_slice(samples);

    let n_frames = if padded.len() < n_fft {
        0
    } else {
        (padded.len() - n_fft) / hop_size + 1
    };

    let mut planner = RealFftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);
    let mut input_buffer = fft.make_input_vec();
    let mut spectrum_buffer = fft.make_output_vec();

    let mut frames = Vec::with_capacity(n_frames);
    for frame_idx in 0..n_frames {
        let start = frame_idx * hop_size;
        for i in 0..n_fft {
            input_buffer[i] = padded[start + i] * window[i];
        }

        fft.process(&mut input_buffer, &mut spectrum_buffer)
            .map_err(|_| DspError::TransformFailed {
                reason: "forward FFT failed".to_string(),
            })?;

        frames.push(spectrum_buffer.clone());
    }

    Ok(Stft {
        frames,
        n_fft,
        hop_size,
    })
}

/// Reconstruct a time-domain signal of `length` samples from a spectrogram.
///
/// Uses overlap-add synthesis with squared-window normalization, then strips
/// the center padding introduced by [`stft`].
pub fn istft(spectrogram: &Stft, length: usize) -> Result<Vec<f32>, DspError> {
    let n_frames = spectrogram.n_frames();
    let n_bins = spectrogram.n_bins();
    if n_frames == 0 || n_bins < 2 {
        return Err(DspError::TransformFailed {
            reason: "spectrogram must contain at least one frame".to_string(),
        });
    }

    let n_fft = (n_bins - 1) * 2;
    let hop_size = spectrogram.hop_size;
    let window = hann_window(n_fft);

    let mut planner = FftPlanner::<f32>::new();
    let ifft = planner.plan_fft_inverse(n_fft);

    let mut signal = vec![0.0f32; n_frames * hop_size + n_fft];
    let mut window_sums = vec![0.0f32; signal.len()];
    let mut buffer = vec![Complex::new(0.0, 0.0); n_fft];

    for (frame_idx, frame) in spectrogram.frames.iter().enumerate() {
        buffer[..n_bins].copy_from_slice(frame);
        // Negative frequencies are the conjugate mirror of the positive half.
        for bin in 1..(n_bins - 1) {
            buffer[n_fft - bin] = frame[bin].conj();
        }

        ifft.process(&mut buffer);

        let start = frame_idx * hop_size;
        let scale = 1.0 / n_fft as f32;
        for i in 0..n_fft {
            let w = window[i];
            signal[start + i] += buffer[i].re * scale * w;
            window_sums[start + i] += w * w;
        }
    }

    for (sample, &wsum) in signal.iter_mut().zip(window_sums.iter()) {
        if wsum > 1e-8 {
            *sample /= wsum;
        }
    }

    let pad = n_fft / 2;
    let mut out = if signal.len() > 2 * pad {
        signal[pad..signal.len() - pad].to_vec()
    } else {
        signal
    };
    out.truncate(length);

    Ok(out)
}
