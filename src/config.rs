use serde::{Deserialize, Serialize};

/// Configuration for rhythm analysis
///
/// The defaults reproduce the reference analysis chain: percussive
/// separation, a 20-150 Hz bass band and a 150-400 Hz snare band, per-band
/// onset spacing of 150 ms and a 100 ms spacing for the merged beat list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Window size for FFT analysis
    pub n_fft: usize,

    /// Hop size between analysis windows
    pub hop_size: usize,

    /// Lower edge of the bass band (Hz)
    pub bass_low_hz: f32,

    /// Upper edge of the bass band (Hz)
    pub bass_high_hz: f32,

    /// Lower edge of the snare band (Hz)
    pub snare_low_hz: f32,

    /// Upper edge of the snare band (Hz)
    pub snare_high_hz: f32,

    /// Number of biquad sections in each bandpass cascade
    pub filter_order: usize,

    /// Minimum spacing between onsets within a single band (seconds)
    pub band_min_interval: f64,

    /// Minimum spacing between beats in the merged list (seconds)
    pub merge_min_interval: f64,

    /// Median-filter kernel length for harmonic/percussive separation
    pub hpss_kernel: usize,

    /// Soft-mask margin for harmonic/percussive separation
    pub hpss_margin: f32,

    /// Minimum BPM to consider during tempo estimation
    pub min_bpm: f32,

    /// Maximum BPM to consider during tempo estimation
    pub max_bpm: f32,

    /// Center of the tempo prior (BPM)
    pub start_bpm: f32,

    /// BPM reported when no estimate can be made
    pub default_bpm: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_size: 512,
            bass_low_hz: 20.0,
            bass_high_hz: 150.0,
            snare_low_hz: 150.0,
            snare_high_hz: 400.0,
            filter_order: 3,
            band_min_interval: 0.15,
            merge_min_interval: 0.1, // wider net once the bands are combined
            hpss_kernel: 31,
            hpss_margin: 3.0,
            min_bpm: 30.0,
            max_bpm: 300.0,
            start_bpm: 120.0,
            default_bpm: 120,
        }
    }
}

impl AnalysisConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.n_fft == 0 || !self.n_fft.is_power_of_two() {
            return Err("FFT window size must be a power of two".to_string());
        }

        if self.hop_size == 0 || self.hop_size > self.n_fft {
            return Err("Hop size must be between 1 and the FFT window size".to_string());
        }

        if self.bass_low_hz <= 0.0 || self.bass_low_hz >= self.bass_high_hz {
            return Err("Bass band edges must satisfy 0 < low < high".to_string());
        }

        if self.snare_low_hz <= 0.0 || self.snare_low_hz >= self.snare_high_hz {
            return Err("Snare band edges must satisfy 0 < low < high".to_string());
        }

        if self.filter_order == 0 {
            return Err("Filter order must be at least 1".to_string());
        }

        if self.band_min_interval <= 0.0 || self.merge_min_interval <= 0.0 {
            return Err("Onset spacing intervals must be positive".to_string());
        }

        if self.hpss_kernel < 3 || self.hpss_kernel % 2 == 0 {
            return Err("HPSS kernel length must be odd and at least 3".to_string());
        }

        if self.hpss_margin < 1.0 {
            return Err("HPSS margin must be at least 1.0".to_string());
        }

        if self.min_bpm <= 0.0 || self.min_bpm >= self.max_bpm {
            return Err("BPM range must satisfy 0 < min < max".to_string());
        }

        if self.start_bpm < self.min_bpm || self.start_bpm > self.max_bpm {
            return Err("Tempo prior must fall inside the BPM range".to_string());
        }

        if self.default_bpm == 0 {
            return Err("Default BPM must be positive".to_string());
        }

        Ok(())
    }
}
