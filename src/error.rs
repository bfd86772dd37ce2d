//! Error handling for Soundlab
//!
//! Every engine failure is a typed value returned to the caller; the
//! engine never terminates the process. Validation runs before any
//! mutation, so a failed operation leaves the registry untouched.

use thiserror::Error;

/// Result type alias for Soundlab operations
pub type Result<T> = std::result::Result<T, SoundlabError>;

/// Main error type for Soundlab operations
#[derive(Error, Debug)]
pub enum SoundlabError {
    // Registry Errors
    #[error("No sound with id '{id}' in the session")]
    NotFound { id: String },

    #[error("Id space exhausted after {attempts} collision retries")]
    RegistryExhausted { attempts: u32 },

    // Composition Errors
    #[error("Sample rate mismatch: expected {expected} Hz, found {found} Hz")]
    SampleRateMismatch { expected: u32, found: u32 },

    #[error("Sound '{label}' has an unresolved Mono channel role; assign Left or Right before composing")]
    UnresolvedChannelRole { label: String },

    // Transform Errors
    #[error("Cut range {start}..{end} invalid for buffer of {len} samples")]
    OutOfRange {
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Cut range covers the whole buffer; remove the sound instead")]
    CutWholeBuffer,

    #[error("Reference signal has zero RMS; level difference is undefined")]
    DivisionByZero,

    // Generation Errors
    #[error("Invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    // File Errors
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SoundlabError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SoundlabError::NotFound { .. } => "NOT_FOUND",
            SoundlabError::RegistryExhausted { .. } => "REGISTRY_EXHAUSTED",
            SoundlabError::SampleRateMismatch { .. } => "SAMPLE_RATE_MISMATCH",
            SoundlabError::UnresolvedChannelRole { .. } => "UNRESOLVED_CHANNEL_ROLE",
            SoundlabError::OutOfRange { .. } => "OUT_OF_RANGE",
            SoundlabError::CutWholeBuffer => "CUT_WHOLE_BUFFER",
            SoundlabError::DivisionByZero => "DIVISION_BY_ZERO",
            SoundlabError::InvalidParameter { .. } => "INVALID_PARAMETER",
            SoundlabError::FileNotFound { .. } => "FILE_NOT_FOUND",
            SoundlabError::InvalidAudio { .. } => "INVALID_AUDIO",
            SoundlabError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            SoundlabError::Io(_) => "IO_ERROR",
            SoundlabError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}
