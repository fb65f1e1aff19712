use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw audio data with metadata
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Audio samples (interleaved for stereo, mono for single channel)
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Duration in seconds
    pub duration: f64,

    /// Original file path
    pub file_path: PathBuf,

    /// Audio format information
    pub format: AudioFormat,
}

impl AudioData {
    /// Get mono mix of all channels
    pub fn mono_samples(&self) -> Vec<f32> {
        if self.channels == 1 {
            return self.samples.clone();
        }

        let mut mono = Vec::with_capacity(self.samples.len() / self.channels as usize);

        for chunk in self.samples.chunks(self.channels as usize) {
            let sum: f32 = chunk.iter().sum();
            mono.push(sum / self.channels as f32);
        }

        mono
    }
}

/// Audio file format information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFormat {
    /// File extension (wav, mp3, flac, etc.)
    pub extension: String,

    /// Bit depth (16, 24, 32, etc.)
    pub bit_depth: Option<u16>,

    /// Compression type (if any)
    pub compression: Option<String>,
}

/// Rhythm analysis report for a single audio file
///
/// This is the record serialized to stdout; field order here is the field
/// order in the JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatReport {
    /// Low-band (kick) onset times in seconds, millisecond precision
    pub bass_hits: Vec<f64>,

    /// Mid-band (snare) onset times in seconds, millisecond precision
    pub snare_hits: Vec<f64>,

    /// Merged beat list: deduplicated union of both bands
    pub all_beats: Vec<f64>,

    /// Estimated tempo in beats per minute
    pub bpm: u32,

    /// Track duration in seconds, rounded to two decimals
    pub duration: f64,

    /// Number of bass onsets (always `bass_hits.len()`)
    pub bass_count: usize,

    /// Number of snare onsets (always `snare_hits.len()`)
    pub snare_count: usize,
}

impl BeatReport {
    /// Check the internal consistency promised to consumers: counts match
    /// list lengths, every list is strictly ascending, and BPM is positive.
    pub fn is_consistent(&self) -> bool {
        let ascending = |times: &[f64]| times.windows(2).all(|pair| pair[1] > pair[0]);

        self.bass_count == self.bass_hits.len()
            && self.snare_count == self.snare_hits.len()
            && ascending(&self.bass_hits)
            && ascending(&self.snare_hits)
            && ascending(&self.all_beats)
            && self.bpm > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_data_mono_conversion() {
        let stereo_samples = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]; // L, R, L, R, L, R
        let audio_data = AudioData {
            samples: stereo_samples,
            sample_rate: 44100,
            channels: 2,
            duration: 1.0,
            file_path: PathBuf::from("test.wav"),
            format: AudioFormat {
                extension: "wav".to_string(),
                bit_depth: Some(16),
                compression: None,
            },
        };

        let mono = audio_data.mono_samples();
        assert_eq!(mono, vec![1.5, 3.5, 5.5]); // Average of L and R channels
    }

    #[test]
    fn test_mono_audio_passes_through() {
        let audio_data = AudioData {
            samples: vec![0.1, 0.2, 0.3],
            sample_rate: 22050,
            channels: 1,
            duration: 3.0 / 22050.0,
            file_path: PathBuf::from("test.wav"),
            format: AudioFormat {
                extension: "wav".to_string(),
                bit_depth: Some(16),
                compression: None,
            },
        };

        assert_eq!(audio_data.mono_samples(), audio_data.samples);
    }

    #[test]
    fn test_report_consistency_check() {
        let report = BeatReport {
            bass_hits: vec![0.5, 1.0],
            snare_hits: vec![0.75],
            all_beats: vec![0.5, 0.75, 1.0],
            bpm: 120,
            duration: 2.0,
            bass_count: 2,
            snare_count: 1,
        };
        assert!(report.is_consistent());

        let mismatched = BeatReport {
            bass_count: 3,
            ..report.clone()
        };
        assert!(!mismatched.is_consistent());

        let unsorted = BeatReport {
            all_beats: vec![1.0, 0.5],
            ..report
        };
        assert!(!unsorted.is_consistent());
    }

    #[test]
    fn test_report_serializes_in_contract_order() {
        let report = BeatReport {
            bass_hits: vec![0.5],
            snare_hits: vec![],
            all_beats: vec![0.5],
            bpm: 120,
            duration: 1.25,
            bass_count: 1,
            snare_count: 0,
        };

        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"bass_hits":[0.5],"snare_hits":[],"all_beats":[0.5],"bpm":120,"duration":1.25,"bass_count":1,"snare_count":0}"#
        );
    }
}
