use thiserror::Error;

/// Main error type for the Beatscan library
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Audio processing error: {0}")]
    Audio(#[from] AudioError),

    #[error("Signal processing error: {0}")]
    Dsp(#[from] DspError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Audio-specific errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Audio decoding failed: {reason}")]
    DecodeFailed { reason: String },

    #[error("Audio analysis failed: {reason}")]
    AnalysisFailed { reason: String },

    #[error("Invalid analysis parameters: {details}")]
    InvalidParameters { details: String },
}

/// Signal-processing errors. These are band-local during analysis: the
/// analyzer downgrades them to an empty onset list instead of aborting.
#[derive(Error, Debug)]
pub enum DspError {
    #[error("Invalid filter band: {details}")]
    InvalidBand { details: String },

    #[error("Signal too short to filter: need at least {needed} samples, got {got}")]
    SignalTooShort { needed: usize, got: usize },

    #[error("Filter produced non-finite output: {reason}")]
    Unstable { reason: String },

    #[error("Spectral transform failed: {reason}")]
    TransformFailed { reason: String },
}

/// Convenience type alias for Results using AnalyzerError
pub type Result<T> = std::result::Result<T, AnalyzerError>;

impl AnalyzerError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Audio(AudioError::FileNotFound { path }) => {
                format!("File not found: {}", path)
            }
            Self::Audio(AudioError::LoadFailed { path }) => {
                format!("Could not load audio file '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::Audio(AudioError::UnsupportedFormat { format }) => {
                format!("Unsupported audio format '{}'. Supported formats: wav, mp3, flac, ogg, m4a.", format)
            }
            _ => self.to_string(),
        }
    }
}
