//! Voice-activity events and session speech state.

use serde::{Deserialize, Serialize};

/// Boundary event produced by a voice detector.
///
/// Detectors may emit events out of order under noisy input; consumers must
/// treat every `StartOfSpeech` as authoritative and reset accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VadEvent {
    /// The user started speaking.
    StartOfSpeech,
    /// The user stopped speaking.
    EndOfSpeech,
}

/// Whether the session currently considers the user to be speaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpeechState {
    /// Not currently collecting speech.
    #[default]
    Idle,
    /// Between start- and end-of-speech; frames are being buffered.
    Speaking,
}
