//! Error types for the voice pipeline.

use thiserror::Error;

/// Result type for voice pipeline operations.
pub type Result<T> = std::result::Result<T, VoiceError>;

/// Errors that can occur while running a voice session.
///
/// Reply cancellation is deliberately not represented here: a barge-in is a
/// normal outcome and is modelled with a cancellation token, never an error.
#[derive(Error, Debug)]
pub enum VoiceError {
    /// Transport-level error (track subscription, frame delivery, publishing).
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Speech-to-text backend error.
    #[error("Transcription error: {0}")]
    TranscriptionError(String),

    /// Language model backend error.
    #[error("Completion error: {0}")]
    CompletionError(String),

    /// Text-to-speech backend error.
    #[error("Synthesis error: {0}")]
    SynthesisError(String),

    /// Audio format or conversion error.
    #[error("Audio error: {0}")]
    AudioError(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// A backend was invoked before it finished initializing.
    #[error("Backend not ready: {0}")]
    NotReady(String),

    /// Timeout waiting for a backend.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl VoiceError {
    /// Create a new transport error.
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create a new transcription error.
    pub fn transcription<S: Into<String>>(msg: S) -> Self {
        Self::TranscriptionError(msg.into())
    }

    /// Create a new completion error.
    pub fn completion<S: Into<String>>(msg: S) -> Self {
        Self::CompletionError(msg.into())
    }

    /// Create a new synthesis error.
    pub fn synthesis<S: Into<String>>(msg: S) -> Self {
        Self::SynthesisError(msg.into())
    }

    /// Create a new audio error.
    pub fn audio<S: Into<String>>(msg: S) -> Self {
        Self::AudioError(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a new not-ready error.
    pub fn not_ready<S: Into<String>>(msg: S) -> Self {
        Self::NotReady(msg.into())
    }

    /// Create a new timeout error.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }
}
