use std::path::Path;

use crate::audio::loader::AudioLoader;
use crate::audio::types::{AudioData, BeatReport};
use crate::config::AnalysisConfig;
use crate::dsp::filter::BandpassFilter;
use crate::dsp::hpss::hpss;
use crate::dsp::onset::{detect_onsets, min_interval_filter, onset_strength};
use crate::dsp::tempo;
use crate::error::{AudioError, DspError, Result};

/// Core rhythm analyzer: percussive separation, per-band onset detection
/// and tempo estimation
///
/// The pipeline is a single pass per file. Band-level failures degrade to
/// empty onset lists and tempo estimation falls back to beat-interval
/// statistics, so the only aborting failures are loading and separation.
pub struct BeatAnalyzer {
    config: AnalysisConfig,
}

impl BeatAnalyzer {
    /// Create a new analyzer with default configuration
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    /// Create a new analyzer with custom configuration
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Load an audio file and analyze its rhythmic structure
    pub fn analyze_path<P: AsRef<Path>>(&self, path: P) -> Result<BeatReport> {
        let audio = AudioLoader::load(path)?;
        self.analyze(&audio)
    }

    /// Analyze already-loaded audio for bass/snare onsets and tempo
    pub fn analyze(&self, audio: &AudioData) -> Result<BeatReport> {
        self.config
            .validate()
            .map_err(|e| AudioError::InvalidParameters { details: e })?;

        tracing::info!(
            "Starting rhythm analysis: {:.2}s of audio at {} Hz, {} channel(s)",
            audio.duration,
            audio.sample_rate,
            audio.channels
        );

        let mono = audio.mono_samples();
        let sample_rate = audio.sample_rate;

        // Step 1: isolate percussive content so melodic energy does not
        // register as onsets
        tracing::debug!("Separating percussive component...");
        let (_harmonic, percussive) = hpss(
            &mono,
            self.config.n_fft,
            self.config.hop_size,
            self.config.hpss_kernel,
            self.config.hpss_margin,
        )
        .map_err(|e| AudioError::AnalysisFailed {
            reason: format!("percussive separation failed: {e}"),
        })?;

        // Steps 2-3: band isolation and onset detection, each band on its own
        tracing::debug!(
            "Detecting bass onsets ({}-{} Hz)...",
            self.config.bass_low_hz,
            self.config.bass_high_hz
        );
        let bass_hits = self.band_onsets(
            &percussive,
            sample_rate,
            self.config.bass_low_hz,
            self.config.bass_high_hz,
            "bass",
        );

        tracing::debug!(
            "Detecting snare onsets ({}-{} Hz)...",
            self.config.snare_low_hz,
            self.config.snare_high_hz
        );
        let snare_hits = self.band_onsets(
            &percussive,
            sample_rate,
            self.config.snare_low_hz,
            self.config.snare_high_hz,
            "snare",
        );

        // Step 4: merged beat list
        let all_beats = merge_beats(&bass_hits, &snare_hits, self.config.merge_min_interval);

        // Step 5: tempo
        let bpm = self.estimate_bpm(&percussive, sample_rate, &all_beats);

        tracing::info!(
            "Analysis complete: {} bass onsets, {} snare onsets, {} beats, {} BPM",
            bass_hits.len(),
            snare_hits.len(),
            all_beats.len(),
            bpm
        );

        let bass_count = bass_hits.len();
        let snare_count = snare_hits.len();

        Ok(BeatReport {
            bass_hits,
            snare_hits,
            all_beats,
            bpm,
            duration: round_to(audio.duration, 2),
            bass_count,
            snare_count,
        })
    }

    /// Onset times for one frequency band of the percussive signal
    ///
    /// Any error here degrades the band to an empty list; a track with no
    /// usable low end should still get its snare analysis and tempo.
    fn band_onsets(
        &self,
        samples: &[f32],
        sample_rate: u32,
        low_hz: f32,
        high_hz: f32,
        label: &str,
    ) -> Vec<f64> {
        match self.try_band_onsets(samples, sample_rate, low_hz, high_hz) {
            Ok(onsets) => onsets,
            Err(e) => {
                tracing::warn!("{label} band degraded to no onsets: {e}");
                Vec::new()
            }
        }
    }

    fn try_band_onsets(
        &self,
        samples: &[f32],
        sample_rate: u32,
        low_hz: f32,
        high_hz: f32,
    ) -> std::result::Result<Vec<f64>, DspError> {
        let filter = BandpassFilter::design(low_hz, high_hz, sample_rate, self.config.filter_order)?;
        let filtered = filter.apply(samples)?;

        detect_onsets(
            &filtered,
            sample_rate,
            self.config.n_fft,
            self.config.hop_size,
            self.config.band_min_interval,
        )
    }

    /// Tempo with the full fallback chain: direct estimation from the
    /// percussive onset envelope, then median beat spacing, then the
    /// configured default.
    fn estimate_bpm(&self, percussive: &[f32], sample_rate: u32, beats: &[f64]) -> u32 {
        let candidates = match onset_strength(percussive, self.config.n_fft, self.config.hop_size)
        {
            Ok(envelope) => tempo::estimate(
                &envelope,
                sample_rate,
                self.config.hop_size,
                self.config.min_bpm,
                self.config.max_bpm,
                self.config.start_bpm,
            ),
            Err(e) => {
                tracing::warn!("Tempo estimation skipped: {e}");
                Vec::new()
            }
        };

        if let Some(bpm) = tempo::normalize_bpm(&candidates) {
            tracing::debug!("Direct tempo estimate: {} BPM", bpm);
            return bpm;
        }

        let bpm = tempo::fallback_from_beats(beats, self.config.default_bpm);
        tracing::debug!("Fallback tempo estimate: {} BPM", bpm);
        bpm
    }
}

impl Default for BeatAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge two onset lists into one beat list: sorted union with exact
/// duplicates removed, then thinned to the merge interval.
fn merge_beats(bass: &[f64], snare: &[f64], min_interval: f64) -> Vec<f64> {
    let mut merged: Vec<f64> = bass.iter().chain(snare.iter()).copied().collect();
    merged.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    // Onset times are millisecond-rounded, so exact comparison is the
    // duplicate test.
    merged.dedup();

    min_interval_filter(&merged, min_interval)
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
