//! Error types for audio acquisition and encoding.

use thiserror::Error;

/// Errors that can occur while acquiring, encoding, or exporting audio.
#[derive(Error, Debug)]
pub enum AudioError {
    /// Source bytes cannot be read at all
    #[error("source not readable: {0}")]
    Unreadable(String),

    /// No decodeable audio track and no usable fallback
    #[error("audio decode failed: {0}")]
    Decode(String),

    /// WAV serialization error
    #[error("wav encoding failed: {0}")]
    Encode(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        AudioError::Encode(err.to_string())
    }
}
