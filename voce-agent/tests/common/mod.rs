//! Recording mock backends shared by the integration suites.

// Not every suite uses every mock.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicI16, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use voce_agent::Session;
use voce_core::{
    AgentConfig, AudioChunk, AudioChunkStream, AudioFormat, AudioFrame, AudioSink, ChatModel,
    Result, Synthesizer, Transcriber, Transcription, Turn, VoiceError,
};

pub const RATE: u32 = 48000;

/// A mono frame of the given length, filled with a constant amplitude.
pub fn frame_ms(ms: u32, amplitude: i16) -> AudioFrame {
    AudioFrame::new(vec![amplitude; (RATE * ms / 1000) as usize], RATE, 1)
}

/// Transcriber that answers with a numbered transcript and counts calls.
#[derive(Default)]
pub struct CountingTranscriber {
    pub calls: AtomicUsize,
    /// Fixed transcript override; numbered transcripts when `None`.
    pub fixed: Option<String>,
}

impl CountingTranscriber {
    pub fn numbered() -> Self {
        Self::default()
    }

    pub fn fixed(text: impl Into<String>) -> Self {
        Self { calls: AtomicUsize::new(0), fixed: Some(text.into()) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for CountingTranscriber {
    fn name(&self) -> &str {
        "counting"
    }

    async fn transcribe(&self, _samples: &[f32], _rate: u32) -> Result<Transcription> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let text = self.fixed.clone().unwrap_or_else(|| format!("utterance {n}"));
        Ok(Transcription { text, language: Some("english".into()) })
    }
}

/// Transcriber whose calls always fail.
pub struct FailingTranscriber;

#[async_trait]
impl Transcriber for FailingTranscriber {
    fn name(&self) -> &str {
        "failing"
    }

    async fn transcribe(&self, _samples: &[f32], _rate: u32) -> Result<Transcription> {
        Err(VoiceError::transcription("backend offline"))
    }
}

/// Transcriber that never reaches readiness within any test deadline.
pub struct SlowStartTranscriber;

#[async_trait]
impl Transcriber for SlowStartTranscriber {
    fn name(&self) -> &str {
        "slow-start"
    }

    async fn ready(&self, _timeout: Duration) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }

    async fn transcribe(&self, _samples: &[f32], _rate: u32) -> Result<Transcription> {
        Err(VoiceError::not_ready("still loading"))
    }
}

/// Chat model that echoes the last user turn.
#[derive(Default)]
pub struct EchoChat {
    pub calls: AtomicUsize,
}

impl EchoChat {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatModel for EchoChat {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(&self, _system: &str, turns: &[Turn], _max_tokens: u32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let last = turns.last().map(|t| t.content.as_str()).unwrap_or_default();
        Ok(format!("you said: {last}"))
    }
}

/// Chat model whose calls always fail.
pub struct FailingChat;

#[async_trait]
impl ChatModel for FailingChat {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _system: &str, _turns: &[Turn], _max_tokens: u32) -> Result<String> {
        Err(VoiceError::completion("rate limited"))
    }
}

/// Synthesizer that yields a fixed number of tagged chunks, pausing between
/// them so barge-in tests have suspension points to cancel at.
///
/// Every synthesis call gets a distinct tag; each chunk's samples are filled
/// with the tag so the recording sink can attribute chunks to replies.
pub struct ChunkedSynth {
    pub chunks: usize,
    pub chunk_gap: Duration,
    tag: AtomicI16,
    /// When set, the stream fails after this many chunks.
    pub fail_after: Option<usize>,
}

impl ChunkedSynth {
    pub fn new(chunks: usize, chunk_gap: Duration) -> Self {
        Self { chunks, chunk_gap, tag: AtomicI16::new(0), fail_after: None }
    }

    pub fn quick() -> Self {
        Self::new(3, Duration::from_millis(1))
    }

    pub fn failing_after(chunks: usize) -> Self {
        Self { fail_after: Some(chunks), ..Self::new(chunks + 10, Duration::from_millis(1)) }
    }
}

#[async_trait]
impl Synthesizer for ChunkedSynth {
    fn name(&self) -> &str {
        "chunked"
    }

    fn output_format(&self) -> AudioFormat {
        AudioFormat::pcm16_24khz()
    }

    async fn synthesize(&self, _text: &str) -> Result<AudioChunkStream> {
        let tag = self.tag.fetch_add(1, Ordering::SeqCst) + 1;
        let chunks = self.chunks;
        let gap = self.chunk_gap;
        let fail_after = self.fail_after;
        let format = self.output_format();
        let stream = async_stream::stream! {
            for i in 0..chunks {
                if fail_after == Some(i) {
                    yield Err(VoiceError::synthesis("stream interrupted"));
                    return;
                }
                tokio::time::sleep(gap).await;
                yield Ok(AudioChunk::new(vec![tag; 240], format));
            }
        };
        Ok(Box::pin(stream))
    }
}

/// Sink that records every chunk it is given.
#[derive(Default)]
pub struct RecordingSink {
    pub chunks: Mutex<Vec<AudioChunk>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.chunks.lock().len()
    }

    /// Tags of the recorded chunks, in arrival order.
    pub fn tags(&self) -> Vec<i16> {
        self.chunks.lock().iter().map(|c| c.samples[0]).collect()
    }
}

#[async_trait]
impl AudioSink for RecordingSink {
    async fn write(&self, chunk: AudioChunk) -> Result<()> {
        self.chunks.lock().push(chunk);
        Ok(())
    }
}

/// Build a session over the given backends with a recording sink.
pub fn session_with(
    config: AgentConfig,
    transcriber: Arc<dyn Transcriber>,
    chat: Arc<dyn ChatModel>,
    synthesizer: Arc<dyn Synthesizer>,
) -> (Arc<Session>, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let session = Session::builder()
        .config(config)
        .transcriber(transcriber)
        .chat_model(chat)
        .synthesizer(synthesizer)
        .sink(sink.clone())
        .build()
        .expect("session builds");
    (session, sink)
}

/// Drive one spoken segment of the given duration through the monitor.
pub fn speak_for(session: &Arc<Session>, ms: u32) {
    session.handle_vad_event(voce_core::VadEvent::StartOfSpeech);
    let mut remaining = ms;
    while remaining > 0 {
        let step = remaining.min(20);
        session.push_frame(frame_ms(step, 6000));
        remaining -= step;
    }
    session.handle_vad_event(voce_core::VadEvent::EndOfSpeech);
}

/// Poll until `cond` holds. Under `start_paused` the sleeps auto-advance, so
/// this is fast and deterministic.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within deadline");
}
