//! Utterance processor: segment in, transcript out.

use crate::session::Session;
use std::sync::Arc;
use tracing::{debug, info, warn};
use voce_core::SpeechSegment;

impl Session {
    /// Turn a finished speech segment into a dialogue turn.
    ///
    /// Runs as an independent task per utterance. Degenerate segments (too
    /// short, empty transcript) are discarded quietly; backend failures drop
    /// the turn and leave the session listening.
    pub(crate) async fn process_utterance(self: Arc<Self>, segment: SpeechSegment) {
        let target_rate = self.transcriber.input_sample_rate();
        let samples = segment.resampled_mono(target_rate);
        let duration_secs = samples.len() as f64 / target_rate as f64;
        if duration_secs < self.config().min_speech.as_secs_f64() {
            debug!(
                session_id = %self.id(),
                duration_secs,
                "utterance below minimum duration, discarding"
            );
            return;
        }

        let transcription = match self.transcriber.transcribe(&samples, target_rate).await {
            Ok(transcription) => transcription,
            Err(e) => {
                warn!(
                    session_id = %self.id(),
                    backend = self.transcriber.name(),
                    error = %e,
                    "transcription failed, dropping turn"
                );
                return;
            }
        };

        let text = transcription.text.trim();
        if text.chars().count() < self.config().min_transcript_chars {
            debug!(session_id = %self.id(), "transcript too short, discarding");
            return;
        }

        info!(
            session_id = %self.id(),
            text = %text,
            language = ?transcription.language,
            "user turn"
        );
        self.take_turn(text.to_string()).await;
    }
}
