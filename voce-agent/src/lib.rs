//! # voce-agent
//!
//! A realtime voice conversational agent: live audio in, spoken replies out.
//!
//! The pipeline segments incoming audio on voice-activity boundaries,
//! transcribes each utterance, asks a language model for a reply, and
//! streams synthesized speech back to the transport. A user who starts
//! speaking mid-reply barges in: the in-flight reply is cancelled at its
//! next suspension point.
//!
//! ```text
//!   frames ──▶ detector ──▶ accumulator ──▶ utterance ──▶ dialogue ──▶ speaker ──▶ sink
//!                │                                                        ▲
//!                └── StartOfSpeech ── cancel ────────────────────────────-┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use voce_agent::providers::{
//!     AnthropicChatModel, AnthropicConfig, CartesiaConfig, CartesiaSynthesizer,
//!     WhisperApiConfig, WhisperApiTranscriber,
//! };
//! use voce_agent::{EnergyVad, Session};
//!
//! let session = Session::builder()
//!     .transcriber(Arc::new(WhisperApiTranscriber::new(WhisperApiConfig::from_env()?)))
//!     .chat_model(Arc::new(AnthropicChatModel::new(AnthropicConfig::from_env()?)))
//!     .synthesizer(Arc::new(CartesiaSynthesizer::new(CartesiaConfig::from_env()?)))
//!     .sink(sink)
//!     .build()?;
//!
//! session.run(frames, Box::new(EnergyVad::new())).await?;
//! session.close().await;
//! ```

pub mod dialogue;
pub mod monitor;
pub mod providers;
pub mod session;
pub mod speaker;
pub mod turn;
pub mod vad;

#[cfg(feature = "livekit")]
pub mod livekit;

// Re-exports
pub use session::{Session, SessionBuilder};
pub use speaker::ActiveReply;
pub use vad::{EnergyVad, EnergyVadConfig};
pub use voce_core::{
    AgentConfig, AudioChunk, AudioFormat, AudioFrame, Result, SpeechState, Turn, VadEvent,
    VoiceError,
};
