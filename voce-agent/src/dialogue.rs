//! Dialogue manager: history bookkeeping and the language-model round trip.

use crate::session::Session;
use tracing::{error, info};
use voce_core::Turn;

impl Session {
    /// Run one dialogue turn for a transcribed utterance.
    ///
    /// The history lock is held across the model call, so concurrent
    /// utterance tasks take their turns one at a time and a rollback can
    /// never remove another task's entry.
    pub(crate) async fn take_turn(&self, text: String) {
        // An utterance can arrive without a fresh start-of-speech having
        // cancelled the previous reply, so cancel again here.
        self.interrupt();

        let mut history = self.history.lock().await;
        history.push(Turn::user(text));
        let turns = history.snapshot();

        match self
            .chat
            .complete(&self.config().system_prompt, &turns, self.config().max_reply_tokens)
            .await
        {
            Ok(reply) => {
                history.push(Turn::assistant(reply.clone()));
                drop(history);
                info!(
                    session_id = %self.id(),
                    model = self.chat.name(),
                    text = %reply,
                    "assistant turn"
                );
                self.start_reply(reply);
            }
            Err(e) => {
                // Put the history back in its pre-turn state.
                history.rollback_user();
                error!(
                    session_id = %self.id(),
                    model = self.chat.name(),
                    error = %e,
                    "completion failed, turn abandoned"
                );
            }
        }
    }
}
