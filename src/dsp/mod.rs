//! # Signal Processing Module
//!
//! The DSP building blocks behind rhythm analysis, kept free of any file or
//! configuration concerns so they stay testable in isolation.
//!
//! ## Components
//!
//! - **STFT/ISTFT**: centered short-time Fourier analysis and overlap-add
//!   reconstruction
//! - **HPSS**: median-filtering harmonic/percussive separation with soft masks
//! - **Bandpass**: zero-phase biquad cascades for band isolation
//! - **Onsets**: spectral-flux envelope, peak picking and interval thinning
//! - **Tempo**: autocorrelation BPM estimation with a prior and fallbacks

pub mod filter;
pub mod hpss;
pub mod onset;
pub mod stft;
pub mod tempo;

pub use filter::BandpassFilter;
pub use hpss::hpss;
pub use onset::{detect_onsets, min_interval_filter, onset_strength};
pub use stft::{hann_window, istft, stft, Stft};
