//! # voce-core
//!
//! Core types for the `voce` realtime voice agent: PCM audio frames and
//! speech segments, voice-activity events, the bounded conversation history,
//! session configuration, and the backend traits the pipeline is wired
//! through.
//!
//! The pipeline itself (session context, voice-activity monitor, dialogue
//! manager, reply speaker, provider backends) lives in `voce-agent`; this
//! crate deliberately stays free of HTTP and transport concerns so backends
//! and tests can depend on it cheaply.
//!
//! ```text
//!   transport frames ──▶ accumulator ──▶ utterance ──▶ dialogue ──▶ speaker ──▶ sink
//!                          ▲                                            │
//!                          └── VadEvent (StartOfSpeech cancels reply) ◀─┘
//! ```

pub mod audio;
pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod history;

// Re-exports
pub use audio::{resample_nearest, AudioChunk, AudioFormat, AudioFrame, SegmentBuffer, SpeechSegment};
pub use backend::{
    AudioChunkStream, AudioSink, BoxedAudioSink, BoxedChatModel, BoxedSynthesizer,
    BoxedTranscriber, BoxedVoiceDetector, ChatModel, Synthesizer, Transcriber, Transcription,
    VoiceDetector,
};
pub use config::AgentConfig;
pub use error::{Result, VoiceError};
pub use events::{SpeechState, VadEvent};
pub use history::{ConversationHistory, Role, Turn};
