//! # Beatscan
//!
//! Offline rhythm analysis for audio files: bass/snare onset times, a merged
//! beat list and an estimated tempo, reported as a single JSON-friendly
//! record.
//!
//! The analysis is one straight pipeline per file: load as mono, separate
//! the percussive component, isolate the kick and snare frequency bands,
//! detect onsets in each, merge them into a beat list and estimate BPM.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use beatscan::{audio::BeatAnalyzer, config::AnalysisConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let analyzer = BeatAnalyzer::with_config(AnalysisConfig::default());
//! let report = analyzer.analyze_path("song.wav")?;
//!
//! println!("{}", serde_json::to_string(&report)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`audio`] - File loading and the analysis pipeline
//! - [`dsp`] - Signal-processing building blocks (STFT, HPSS, filtering,
//!   onsets, tempo)
//! - [`config`] - Analysis parameters and validation
//! - [`error`] - Error taxonomy
//!
//! Band-level problems (a filter that cannot be designed at the file's
//! sample rate, a signal too short to analyze) degrade that band to an
//! empty onset list; tempo estimation falls back to beat-interval
//! statistics and finally a fixed default. Only loading and separation
//! failures abort an analysis.

pub mod audio;
pub mod config;
pub mod dsp;
pub mod error;

// Re-export commonly used types for convenience
pub use crate::{
    audio::{BeatAnalyzer, BeatReport},
    config::AnalysisConfig,
    error::{AnalyzerError, Result},
};
