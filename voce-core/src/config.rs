//! Session configuration.

use crate::audio::AudioFormat;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly voice assistant. Keep your answers \
     brief and conversational, and reply in the language the user speaks.";

const DEFAULT_GREETING: &str = "Hello! I'm listening.";

const DEFAULT_NOT_READY_NOTICE: &str =
    "Sorry, my speech recognition is still starting up. Give me a moment.";

/// Tunables for one voice session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// System instruction for the language model.
    pub system_prompt: String,

    /// Spoken when the session starts. `None` disables the greeting.
    pub greeting: Option<String>,

    /// Spoken when a backend misses its readiness deadline.
    pub not_ready_notice: String,

    /// Maximum turns retained in the conversation history.
    pub history_cap: usize,

    /// Utterances shorter than this are discarded without transcription.
    pub min_speech: Duration,

    /// Hard cap on buffered speech; frames past it are dropped.
    pub max_speech: Duration,

    /// Trimmed transcripts shorter than this many characters are discarded.
    pub min_transcript_chars: usize,

    /// Response-length cap passed to the language model.
    pub max_reply_tokens: u32,

    /// Format the output sink expects.
    pub output_format: AudioFormat,

    /// How long session startup waits for slow backends before speaking the
    /// not-ready notice and continuing degraded.
    pub ready_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            greeting: Some(DEFAULT_GREETING.to_string()),
            not_ready_notice: DEFAULT_NOT_READY_NOTICE.to_string(),
            history_cap: 20,
            min_speech: Duration::from_millis(500),
            max_speech: Duration::from_secs(30),
            min_transcript_chars: 2,
            max_reply_tokens: 150,
            output_format: AudioFormat::pcm16_24khz(),
            ready_timeout: Duration::from_secs(30),
        }
    }
}

impl AgentConfig {
    /// Create a configuration with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set the greeting spoken at session start.
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }

    /// Disable the greeting.
    pub fn without_greeting(mut self) -> Self {
        self.greeting = None;
        self
    }

    /// Set the history cap.
    pub fn with_history_cap(mut self, cap: usize) -> Self {
        self.history_cap = cap;
        self
    }

    /// Set the minimum utterance duration.
    pub fn with_min_speech(mut self, min: Duration) -> Self {
        self.min_speech = min;
        self
    }

    /// Set the maximum buffered speech duration.
    pub fn with_max_speech(mut self, max: Duration) -> Self {
        self.max_speech = max;
        self
    }

    /// Set the reply token cap.
    pub fn with_max_reply_tokens(mut self, tokens: u32) -> Self {
        self.max_reply_tokens = tokens;
        self
    }

    /// Set the output sink format.
    pub fn with_output_format(mut self, format: AudioFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the backend readiness deadline.
    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if self.history_cap == 0 {
            return Err(crate::VoiceError::config("history_cap must be at least 1"));
        }
        if self.max_speech < self.min_speech {
            return Err(crate::VoiceError::config("max_speech must be >= min_speech"));
        }
        if self.max_reply_tokens == 0 {
            return Err(crate::VoiceError::config("max_reply_tokens must be at least 1"));
        }
        Ok(())
    }
}
