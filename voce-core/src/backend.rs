//! Backend traits at the pipeline's external seams.
//!
//! Each trait covers one external collaborator: speech-to-text, the language
//! model, text-to-speech, the output transport, and voice-activity
//! detection. Provider implementations live in `voce-agent`; tests supply
//! recording mocks.

use crate::audio::{AudioChunk, AudioFormat, AudioFrame};
use crate::events::VadEvent;
use crate::history::Turn;
use crate::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// A lazy stream of synthesized audio chunks.
pub type AudioChunkStream = Pin<Box<dyn Stream<Item = Result<AudioChunk>> + Send>>;

/// Result of transcribing one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcription {
    /// The recognized text.
    pub text: String,
    /// BCP-47-ish language tag reported by the backend, if any.
    pub language: Option<String>,
}

/// Speech-to-text backend.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Backend name, for logging.
    fn name(&self) -> &str;

    /// Sample rate the backend expects its input at.
    fn input_sample_rate(&self) -> u32 {
        16000
    }

    /// Wait until the backend can accept work, up to `timeout`.
    ///
    /// Backends without startup cost are ready immediately.
    async fn ready(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    /// Transcribe mono f32 samples at `sample_rate`.
    async fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<Transcription>;
}

/// Language-model backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Backend name, for logging.
    fn name(&self) -> &str;

    /// Produce a reply to the bounded conversation, capped at `max_tokens`.
    async fn complete(&self, system: &str, turns: &[Turn], max_tokens: u32) -> Result<String>;
}

/// Text-to-speech backend.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Backend name, for logging.
    fn name(&self) -> &str;

    /// Format of the chunks the returned stream yields.
    fn output_format(&self) -> AudioFormat;

    /// Start synthesizing `text`, yielding chunks as they arrive.
    async fn synthesize(&self, text: &str) -> Result<AudioChunkStream>;
}

/// Where synthesized audio goes (e.g. a published transport track).
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Write one chunk to the output.
    async fn write(&self, chunk: AudioChunk) -> Result<()>;
}

/// Turns raw frames into speech-boundary events.
///
/// The detector sees every frame in arrival order, whether or not the
/// session is currently buffering speech.
pub trait VoiceDetector: Send {
    /// Feed one frame; returns a boundary event if one was crossed.
    fn push_frame(&mut self, frame: &AudioFrame) -> Option<VadEvent>;
}

/// Shared transcriber handle.
pub type BoxedTranscriber = Arc<dyn Transcriber>;
/// Shared chat model handle.
pub type BoxedChatModel = Arc<dyn ChatModel>;
/// Shared synthesizer handle.
pub type BoxedSynthesizer = Arc<dyn Synthesizer>;
/// Shared sink handle.
pub type BoxedAudioSink = Arc<dyn AudioSink>;
/// Owned detector handle.
pub type BoxedVoiceDetector = Box<dyn VoiceDetector>;
