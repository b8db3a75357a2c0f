//! Voice-activity monitor and frame accumulator.

use crate::session::Session;
use std::sync::Arc;
use tracing::debug;
use voce_core::{AudioFrame, SpeechState, VadEvent};

impl Session {
    /// Offer one transport frame to the accumulator.
    ///
    /// Frames are only buffered between start- and end-of-speech; everything
    /// else is dropped here.
    pub fn push_frame(&self, frame: AudioFrame) {
        if *self.state_mutex().lock() == SpeechState::Speaking {
            self.buffer_mutex().lock().push(frame);
        }
    }

    /// Apply one voice-activity event.
    ///
    /// Detectors can misbehave, so every transition is tolerated from either
    /// state: a start always resets the buffer, a stray end is a no-op.
    pub fn handle_vad_event(self: &Arc<Self>, event: VadEvent) {
        match event {
            VadEvent::StartOfSpeech => {
                debug!(session_id = %self.id(), "start of speech");
                *self.state_mutex().lock() = SpeechState::Speaking;
                self.buffer_mutex().lock().reset();
                // Barge-in: stop talking as soon as the user starts.
                self.interrupt();
            }
            VadEvent::EndOfSpeech => {
                let was_speaking = {
                    let mut state = self.state_mutex().lock();
                    std::mem::replace(&mut *state, SpeechState::Idle) == SpeechState::Speaking
                };
                if !was_speaking {
                    debug!(session_id = %self.id(), "stray end of speech ignored");
                    return;
                }

                let segment = self.buffer_mutex().lock().take();
                if segment.is_empty() {
                    debug!(session_id = %self.id(), "end of speech with empty buffer");
                    return;
                }

                debug!(
                    session_id = %self.id(),
                    duration_secs = segment.duration_secs(),
                    frames = segment.frame_count(),
                    "end of speech, handing segment off"
                );
                // Handoff never blocks the event loop: the utterance runs as
                // its own tracked task.
                let session = self.clone();
                self.tasks().spawn(async move {
                    session.process_utterance(segment).await;
                });
            }
        }
    }
}
