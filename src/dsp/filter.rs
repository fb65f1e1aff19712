//! Zero-phase bandpass filtering.
//!
//! A band is realized as a cascade of identical constant-peak-gain biquads
//! centered on the geometric mean of the band edges. Each section is applied
//! forward and backward over an odd-reflection padded copy of the signal, so
//! the filtered output carries no phase shift and onset positions survive
//! intact.

use crate::error::DspError;

/// Cascaded bandpass filter with zero-phase application.
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    sections: Vec<Biquad>,
    low_hz: f32,
    high_hz: f32,
}

impl BandpassFilter {
    /// Design a bandpass cascade for the band `[low_hz, high_hz]`.
    ///
    /// Band edges are normalized to Nyquist and clamped into (0.001, 0.999).
    /// An inverted band after clamping is forced open by a hundredth of
    /// Nyquist; if that pushes the upper edge to or beyond Nyquist the band
    /// is unusable at this sample rate and the design fails.
    pub fn design(
        low_hz: f32,
        high_hz: f32,
        sample_rate: u32,
        order: usize,
    ) -> Result<Self, DspError> {
        let nyquist = sample_rate as f64 / 2.0;

        let mut low = (low_hz as f64 / nyquist).clamp(0.001, 0.999);
        let mut high = (high_hz as f64 / nyquist).clamp(0.001, 0.999);
        if low >= high {
            high = low + 0.01;
        }
        if high >= 1.0 {
            return Err(DspError::InvalidBand {
                details: format!(
                    "{}-{} Hz is not usable at a {} Hz sample rate",
                    low_hz, high_hz, sample_rate
                ),
            });
        }

        low *= nyquist;
        high *= nyquist;

        let center = (low * high).sqrt();
        let bandwidth = (high - low).max(1.0);

        let sections = (0..order.max(1))
            .map(|_| Biquad::bandpass(center, bandwidth, sample_rate as f64))
            .collect();

        Ok(Self {
            sections,
            low_hz,
            high_hz,
        })
    }

    /// Band edges this filter was designed for, in Hz.
    pub fn band(&self) -> (f32, f32) {
        (self.low_hz, self.high_hz)
    }

    /// Apply the cascade with zero-phase (forward-backward) filtering.
    pub fn apply(&self, input: &[f32]) -> Result<Vec<f32>, DspError> {
        let pad_len = 3 * 3.max(input.len() / 10).min(100);
        if input.len() <= pad_len {
            return Err(DspError::SignalTooShort {
                needed: pad_len + 1,
                got: input.len(),
            });
        }

        let mut result = input.to_vec();
        for section in &self.sections {
            result = section.filtfilt(&result, pad_len);
        }

        if result.iter().any(|v| !v.is_finite()) {
            return Err(DspError::Unstable {
                reason: format!("band {}-{} Hz", self.low_hz, self.high_hz),
            });
        }

        Ok(result)
    }
}

/// Single biquad section, coefficients and state in f64 for stability at
/// low normalized frequencies.
#[derive(Debug, Clone)]
struct Biquad {
    b: [f64; 3],
    a: [f64; 3],
}

impl Biquad {
    /// Constant 0 dB peak gain bandpass section.
    fn bandpass(center: f64, bandwidth: f64, sample_rate: f64) -> Self {
        use std::f64::consts::PI;

        let omega0 = 2.0 * PI * center / sample_rate;
        let cos_omega0 = omega0.cos();
        let sin_omega0 = omega0.sin();

        let q = center / bandwidth;
        let alpha = sin_omega0 / (2.0 * q);

        let b0 = alpha;
        let b1 = 0.0;
        let b2 = -alpha;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega0;
        let a2 = 1.0 - alpha;

        Biquad {
            b: [b0 / a0, b1 / a0, b2 / a0],
            a: [1.0, a1 / a0, a2 / a0],
        }
    }

    /// Direct form II transposed.
    fn filter(&self, input: &[f32]) -> Vec<f32> {
        let mut output = vec![0.0f32; input.len()];
        let mut z1 = 0.0f64;
        let mut z2 = 0.0f64;

        for (i, &x) in input.iter().enumerate() {
            let x = x as f64;
            let y = self.b[0] * x + z1;
            z1 = self.b[1] * x - self.a[1] * y + z2;
            z2 = self.b[2] * x - self.a[2] * y;
            output[i] = y as f32;
        }

        output
    }

    /// Forward-backward filtering over an odd-reflection padded signal.
    fn filtfilt(&self, input: &[f32], pad_len: usize) -> Vec<f32> {
        let last = input.len() - 1;
        let mut padded = Vec::with_capacity(input.len() + 2 * pad_len);

        for i in (1..=pad_len).rev() {
            let idx = i.min(last);
            padded.push(2.0 * input[0] - input[idx]);
        }
        padded.extend_from_slice(input);
        for i in 1..=pad_len {
            let idx = last.saturating_sub(i);
            padded.push(2.0 * input[last] - input[idx]);
        }

        let forward = self.filter(&padded);
        let reversed: Vec<f32> = forward.into_iter().rev().collect();
        let backward = self.filter(&reversed);

        backward
            .into_iter()
            .rev()
            .skip(pad_len)
            .take(input.len())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, sample_rate: u32, duration: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * freq * t).sin()
            })
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|x| x * x).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn test_design_accepts_bass_band() {
        assert!(BandpassFilter::design(20.0, 150.0, 22050, 3).is_ok());
    }

    #[test]
    fn test_design_rejects_band_above_nyquist() {
        // Both edges clamp to the top of the usable range, forcing the band
        // past Nyquist.
        let result = BandpassFilter::design(15000.0, 16000.0, 22050, 3);
        assert!(matches!(result, Err(DspError::InvalidBand { .. })));
    }

    #[test]
    fn test_inverted_band_is_forced_open() {
        let filter = BandpassFilter::design(100.0, 90.0, 22050, 3).unwrap();
        let (low, high) = filter.band();
        assert_eq!(low, 100.0);
        assert_eq!(high, 90.0);
    }

    #[test]
    fn test_passband_tone_survives() {
        let filter = BandpassFilter::design(20.0, 150.0, 22050, 3).unwrap();
        let input = tone(60.0, 22050, 1.0);
        let output = filter.apply(&input).unwrap();

        let mid = 2000..input.len() - 2000;
        assert!(rms(&output[mid.clone()]) > 0.5 * rms(&input[mid]));
    }

    #[test]
    fn test_stopband_tone_is_attenuated() {
        let filter = BandpassFilter::design(20.0, 150.0, 22050, 3).unwrap();
        let input = tone(1000.0, 22050, 1.0);
        let output = filter.apply(&input).unwrap();

        let mid = 2000..input.len() - 2000;
        assert!(rms(&output[mid.clone()]) < 0.05 * rms(&input[mid]));
    }

    #[test]
    fn test_zero_phase_keeps_burst_position() {
        let sample_rate = 8000;
        let mut input = vec![0.0f32; sample_rate as usize];

        // 80 Hz burst with a Hann envelope peaking at sample 4200
        let burst_start = 4000;
        let burst_len = 400;
        for i in 0..burst_len {
            let t = (burst_start + i) as f32 / sample_rate as f32;
            let env = 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / burst_len as f32).cos();
            input[burst_start + i] = env * (2.0 * std::f32::consts::PI * 80.0 * t).sin();
        }

        let filter = BandpassFilter::design(20.0, 150.0, sample_rate, 3).unwrap();
        let output = filter.apply(&input).unwrap();

        let peak_idx = output
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().partial_cmp(&b.1.abs()).unwrap())
            .map(|(i, _)| i)
            .unwrap();

        assert!(
            (peak_idx as isize - 4200).unsigned_abs() < 100,
            "burst peak moved to {peak_idx}"
        );
    }

    #[test]
    fn test_short_signal_is_rejected() {
        let filter = BandpassFilter::design(20.0, 150.0, 22050, 3).unwrap();
        let result = filter.apply(&[0.0; 8]);
        assert!(matches!(result, Err(DspError::SignalTooShort { .. })));
    }
}
