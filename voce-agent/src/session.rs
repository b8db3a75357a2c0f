//! Per-session context and the loops that drive it.

use crate::speaker::ActiveReply;
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};
use uuid::Uuid;
use voce_core::{
    AgentConfig, AudioFrame, BoxedAudioSink, BoxedChatModel, BoxedSynthesizer, BoxedTranscriber,
    BoxedVoiceDetector, ConversationHistory, Result, SegmentBuffer, SpeechState, Turn, VadEvent,
    VoiceError,
};

/// One voice conversation: all of its state and task handles.
///
/// Everything is per-session; running several sessions in one process means
/// building several of these. Spawned work (utterance processing, reply
/// streaming) is owned by the session's task tracker and joined on close.
pub struct Session {
    id: Uuid,
    config: AgentConfig,
    state: Mutex<SpeechState>,
    buffer: Mutex<SegmentBuffer>,
    pub(crate) history: tokio::sync::Mutex<ConversationHistory>,
    pub(crate) active_reply: Mutex<Option<ActiveReply>>,
    tasks: TaskTracker,
    shutdown: CancellationToken,
    pub(crate) transcriber: BoxedTranscriber,
    pub(crate) chat: BoxedChatModel,
    pub(crate) synthesizer: BoxedSynthesizer,
    pub(crate) sink: BoxedAudioSink,
}

impl Session {
    /// Create a builder.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Session identifier, for logging and correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The session configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Current speech state.
    pub fn speech_state(&self) -> SpeechState {
        *self.state.lock()
    }

    /// Seconds of speech currently buffered.
    pub fn buffered_secs(&self) -> f64 {
        self.buffer.lock().duration_secs()
    }

    /// Snapshot of the conversation so far, oldest-first.
    pub async fn history_snapshot(&self) -> Vec<Turn> {
        self.history.lock().await.snapshot()
    }

    pub(crate) fn tasks(&self) -> &TaskTracker {
        &self.tasks
    }

    pub(crate) fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    pub(crate) fn state_mutex(&self) -> &Mutex<SpeechState> {
        &self.state
    }

    pub(crate) fn buffer_mutex(&self) -> &Mutex<SegmentBuffer> {
        &self.buffer
    }

    /// Wait for slow backends and speak the opening line.
    ///
    /// A transcriber that misses its readiness deadline downgrades the
    /// session instead of hanging it: the not-ready notice is spoken and
    /// later utterances fail individually until the backend comes up.
    pub async fn start(&self) {
        info!(session_id = %self.id, "session starting");
        let deadline = self.config.ready_timeout;
        // The outer timeout guards against backends that ignore theirs.
        let ready = match tokio::time::timeout(deadline, self.transcriber.ready(deadline)).await {
            Ok(result) => result,
            Err(_) => Err(VoiceError::timeout(format!(
                "readiness deadline of {}s passed",
                deadline.as_secs_f64()
            ))),
        };
        match ready {
            Ok(()) => {
                if let Some(greeting) = self.config.greeting.clone() {
                    self.say(greeting).await;
                }
            }
            Err(e) => {
                warn!(
                    session_id = %self.id,
                    backend = self.transcriber.name(),
                    error = %e,
                    "transcriber missed readiness deadline, continuing degraded"
                );
                self.say(self.config.not_ready_notice.clone()).await;
            }
        }
    }

    /// Drive the session from a transport frame stream.
    ///
    /// Every frame goes through the detector in arrival order; boundary
    /// events are applied so that the frame which crossed a start boundary
    /// lands in the fresh buffer. Returns when the stream ends or the
    /// session is closed.
    pub async fn run<F>(self: &Arc<Self>, frames: F, mut detector: BoxedVoiceDetector) -> Result<()>
    where
        F: Stream<Item = AudioFrame> + Send,
    {
        self.start().await;

        tokio::pin!(frames);
        loop {
            let frame = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                frame = frames.next() => match frame {
                    Some(frame) => frame,
                    None => break,
                },
            };

            let event = detector.push_frame(&frame);
            if event == Some(VadEvent::StartOfSpeech) {
                self.handle_vad_event(VadEvent::StartOfSpeech);
            }
            self.push_frame(frame);
            if event == Some(VadEvent::EndOfSpeech) {
                self.handle_vad_event(VadEvent::EndOfSpeech);
            }
        }

        info!(session_id = %self.id, "frame stream ended");
        Ok(())
    }

    /// Let in-flight work run to completion, then return.
    pub async fn finish(&self) {
        self.tasks.close();
        self.tasks.wait().await;
    }

    /// Cancel everything in flight and join all session tasks.
    pub async fn close(&self) {
        info!(session_id = %self.id, "session closing");
        self.shutdown.cancel();
        self.tasks.close();
        self.tasks.wait().await;
    }
}

/// Builder for [`Session`].
#[derive(Default)]
pub struct SessionBuilder {
    config: AgentConfig,
    transcriber: Option<BoxedTranscriber>,
    chat: Option<BoxedChatModel>,
    synthesizer: Option<BoxedSynthesizer>,
    sink: Option<BoxedAudioSink>,
}

impl SessionBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session configuration.
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the speech-to-text backend.
    pub fn transcriber(mut self, transcriber: BoxedTranscriber) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Set the language-model backend.
    pub fn chat_model(mut self, chat: BoxedChatModel) -> Self {
        self.chat = Some(chat);
        self
    }

    /// Set the text-to-speech backend.
    pub fn synthesizer(mut self, synthesizer: BoxedSynthesizer) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Set the output sink.
    pub fn sink(mut self, sink: BoxedAudioSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Build the session.
    pub fn build(self) -> Result<Arc<Session>> {
        self.config.validate()?;
        let transcriber =
            self.transcriber.ok_or_else(|| VoiceError::config("transcriber is required"))?;
        let chat = self.chat.ok_or_else(|| VoiceError::config("chat model is required"))?;
        let synthesizer =
            self.synthesizer.ok_or_else(|| VoiceError::config("synthesizer is required"))?;
        let sink = self.sink.ok_or_else(|| VoiceError::config("audio sink is required"))?;

        Ok(Arc::new(Session {
            id: Uuid::new_v4(),
            state: Mutex::new(SpeechState::Idle),
            buffer: Mutex::new(SegmentBuffer::new(self.config.max_speech)),
            history: tokio::sync::Mutex::new(ConversationHistory::new(self.config.history_cap)),
            active_reply: Mutex::new(None),
            tasks: TaskTracker::new(),
            shutdown: CancellationToken::new(),
            config: self.config,
            transcriber,
            chat,
            synthesizer,
            sink,
        }))
    }
}
