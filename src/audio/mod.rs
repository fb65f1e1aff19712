//! # Audio Analysis Module
//!
//! Loads audio files and analyzes their rhythmic structure: kick and snare
//! onset times, a merged beat list and an estimated tempo.
//!
//! ## Core Features
//!
//! - **Loading**: WAV via hound, compressed formats via Symphonia, mixed
//!   down to mono at the file's native sample rate
//! - **Band Onsets**: percussive separation followed by per-band (bass and
//!   snare) zero-phase filtering and onset detection
//! - **Tempo**: BPM estimation with interval-statistics and default
//!   fallbacks
//!
//! ## Usage
//!
//! ```rust,no_run
//! use beatscan::audio::BeatAnalyzer;
//!
//! # fn main() -> anyhow::Result<()> {
//! let analyzer = BeatAnalyzer::new();
//! let report = analyzer.analyze_path("song.wav")?;
//!
//! println!("Detected BPM: {}", report.bpm);
//! println!("Found {} beats", report.all_beats.len());
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod loader;
pub mod types;

pub use analyzer::BeatAnalyzer;
pub use loader::AudioLoader;
pub use types::{AudioData, AudioFormat, BeatReport};
