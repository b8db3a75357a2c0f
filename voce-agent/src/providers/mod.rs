//! Backend implementations for the pipeline's trait seams.

pub mod anthropic;
pub mod cartesia;
pub mod warmup;
pub mod whisper;

pub use anthropic::{AnthropicChatModel, AnthropicConfig};
pub use cartesia::{CartesiaConfig, CartesiaSynthesizer};
pub use warmup::WarmupTranscriber;
pub use whisper::{WhisperApiConfig, WhisperApiTranscriber};
