//! Reply speaker: streams synthesized audio to the sink, with barge-in.

use crate::session::Session;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
use voce_core::{BoxedAudioSink, BoxedSynthesizer};

/// Handle to the reply currently being spoken.
///
/// At most one reply is in flight per session; starting a new one supersedes
/// the previous handle. Cancellation is cooperative: the speaking task stops
/// forwarding at its next suspension point and then signals completion.
#[derive(Debug, Clone)]
pub struct ActiveReply {
    cancel: CancellationToken,
    done: CancellationToken,
}

impl ActiveReply {
    pub(crate) fn new(parent: &CancellationToken) -> Self {
        Self { cancel: parent.child_token(), done: CancellationToken::new() }
    }

    /// Request cancellation. Safe to call more than once, and may race with
    /// natural completion.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the reply has reached its cancelled-or-finished state.
    pub fn is_finished(&self) -> bool {
        self.done.is_cancelled()
    }

    /// Wait for the reply to reach its cancelled-or-finished state.
    pub async fn finished(&self) {
        self.done.cancelled().await;
    }
}

impl Session {
    /// Start speaking `text`, superseding any reply already in flight.
    ///
    /// The returned handle can be used to await or cancel the reply; the
    /// session keeps its own handle for barge-in.
    pub fn start_reply(&self, text: String) -> ActiveReply {
        let reply = ActiveReply::new(self.shutdown_token());
        let previous = self.active_reply.lock().replace(reply.clone());
        if let Some(prev) = &previous {
            if !prev.is_finished() {
                debug!(session_id = %self.id(), "superseding reply in flight");
                prev.cancel();
            }
        }

        let synthesizer = self.synthesizer.clone();
        let sink = self.sink.clone();
        let cancel = reply.cancel.clone();
        let done = reply.done.clone();
        self.tasks().spawn(async move {
            // Signals completion on every exit path, including panics.
            let _completion = done.drop_guard();

            // The old reply must be fully stopped before any new chunk goes
            // to the sink.
            if let Some(prev) = previous {
                prev.finished().await;
            }
            if cancel.is_cancelled() {
                return;
            }
            stream_reply(synthesizer, sink, &text, &cancel).await;
        });

        reply
    }

    /// Speak `text` and wait until it has been fully streamed (or cancelled
    /// by a barge-in).
    pub async fn say(&self, text: impl Into<String>) {
        self.start_reply(text.into()).finished().await;
    }

    /// Cancel the reply in flight, if any. A barge-in entry point; a no-op
    /// when nothing is being spoken.
    pub fn interrupt(&self) {
        let slot = self.active_reply.lock();
        if let Some(reply) = slot.as_ref() {
            if !reply.is_finished() {
                debug!(session_id = %self.id(), "interrupting active reply");
                reply.cancel();
            }
        }
    }

    /// Whether a reply is currently being spoken.
    pub fn is_replying(&self) -> bool {
        self.active_reply.lock().as_ref().is_some_and(|r| !r.is_finished())
    }
}

/// Forward synthesized chunks to the sink until the stream ends, an error
/// occurs, or cancellation is requested. Cancellation is a normal outcome
/// and is not logged as a failure.
async fn stream_reply(
    synthesizer: BoxedSynthesizer,
    sink: BoxedAudioSink,
    text: &str,
    cancel: &CancellationToken,
) {
    let mut stream = tokio::select! {
        _ = cancel.cancelled() => return,
        result = synthesizer.synthesize(text) => match result {
            Ok(stream) => stream,
            Err(e) => {
                error!(backend = synthesizer.name(), error = %e, "synthesis request failed");
                return;
            }
        },
    };

    loop {
        let chunk = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("reply cancelled mid-stream");
                return;
            }
            next = stream.next() => match next {
                None => break,
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    error!(backend = synthesizer.name(), error = %e, "synthesis stream failed");
                    return;
                }
            },
        };

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("reply cancelled mid-stream");
                return;
            }
            result = sink.write(chunk) => {
                if let Err(e) = result {
                    error!(error = %e, "audio sink write failed");
                    return;
                }
            }
        }
    }
}
