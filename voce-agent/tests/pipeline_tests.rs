//! End-to-end pipeline behavior over mock backends.

mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use voce_core::{AgentConfig, Role, VadEvent};

fn quiet_config() -> AgentConfig {
    AgentConfig::new().without_greeting()
}

#[tokio::test(start_paused = true)]
async fn two_second_utterance_creates_a_turn() {
    let transcriber = Arc::new(CountingTranscriber::fixed("hello"));
    let chat = Arc::new(EchoChat::default());
    let (session, sink) =
        session_with(quiet_config(), transcriber.clone(), chat.clone(), Arc::new(ChunkedSynth::quick()));

    speak_for(&session, 2000);
    session.finish().await;

    assert_eq!(transcriber.call_count(), 1);
    assert_eq!(chat.call_count(), 1);
    let history = session.history_snapshot().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].content, "hello");
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].content, "you said: hello");
    assert!(sink.count() > 0);
}

#[tokio::test(start_paused = true)]
async fn short_utterance_never_reaches_backends() {
    let transcriber = Arc::new(CountingTranscriber::numbered());
    let chat = Arc::new(EchoChat::default());
    let (session, sink) =
        session_with(quiet_config(), transcriber.clone(), chat.clone(), Arc::new(ChunkedSynth::quick()));

    speak_for(&session, 300);
    session.finish().await;

    assert_eq!(transcriber.call_count(), 0);
    assert_eq!(chat.call_count(), 0);
    assert!(session.history_snapshot().await.is_empty());
    assert_eq!(sink.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn single_character_transcript_is_discarded() {
    let transcriber = Arc::new(CountingTranscriber::fixed("  a "));
    let chat = Arc::new(EchoChat::default());
    let (session, _sink) =
        session_with(quiet_config(), transcriber.clone(), chat.clone(), Arc::new(ChunkedSynth::quick()));

    speak_for(&session, 2000);
    session.finish().await;

    assert_eq!(transcriber.call_count(), 1);
    assert_eq!(chat.call_count(), 0);
    assert!(session.history_snapshot().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn completion_failure_rolls_history_back() {
    let transcriber = Arc::new(CountingTranscriber::fixed("hello"));
    let (session, sink) = session_with(
        quiet_config(),
        transcriber,
        Arc::new(FailingChat),
        Arc::new(ChunkedSynth::quick()),
    );

    speak_for(&session, 2000);
    session.finish().await;

    // No unmatched user entry survives the failed turn.
    assert!(session.history_snapshot().await.is_empty());
    assert_eq!(sink.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn transcription_failure_drops_the_turn() {
    let chat = Arc::new(EchoChat::default());
    let (session, sink) = session_with(
        quiet_config(),
        Arc::new(FailingTranscriber),
        chat.clone(),
        Arc::new(ChunkedSynth::quick()),
    );

    speak_for(&session, 2000);
    session.finish().await;

    assert_eq!(chat.call_count(), 0);
    assert!(session.history_snapshot().await.is_empty());
    assert_eq!(sink.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn history_keeps_only_the_most_recent_turns() {
    let transcriber = Arc::new(CountingTranscriber::numbered());
    let chat = Arc::new(EchoChat::default());
    let (session, _sink) =
        session_with(quiet_config(), transcriber, chat, Arc::new(ChunkedSynth::quick()));

    for n in 0..12 {
        speak_for(&session, 2000);
        // Each turn appends two entries; wait for it to land before the next.
        let expected = ((n + 1) * 2).min(20);
        for attempt in 0.. {
            if session.history_snapshot().await.len() >= expected {
                break;
            }
            assert!(attempt < 1000, "turn {n} never landed");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
    session.finish().await;

    let history = session.history_snapshot().await;
    assert_eq!(history.len(), 20);
    // 24 entries were produced; the oldest two turns were evicted.
    assert_eq!(history[0].content, "utterance 2");
    assert_eq!(history[19].content, "you said: utterance 11");
}

#[tokio::test(start_paused = true)]
async fn greeting_is_spoken_on_start() {
    let (session, sink) = session_with(
        AgentConfig::new().with_greeting("ciao"),
        Arc::new(CountingTranscriber::numbered()),
        Arc::new(EchoChat::default()),
        Arc::new(ChunkedSynth::quick()),
    );

    session.start().await;
    assert!(sink.count() > 0);
}

#[tokio::test(start_paused = true)]
async fn slow_backend_downgrades_instead_of_hanging() {
    let (session, sink) = session_with(
        AgentConfig::new().with_ready_timeout(Duration::from_secs(2)),
        Arc::new(SlowStartTranscriber),
        Arc::new(EchoChat::default()),
        Arc::new(ChunkedSynth::quick()),
    );

    // Returns despite the backend never becoming ready, and the not-ready
    // notice is spoken in place of the greeting.
    session.start().await;
    assert!(sink.count() > 0);

    // Utterances are dropped while degraded, not queued.
    speak_for(&session, 2000);
    session.finish().await;
    assert!(session.history_snapshot().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn synthesis_stream_error_keeps_session_alive() {
    let transcriber = Arc::new(CountingTranscriber::fixed("hello"));
    let chat = Arc::new(EchoChat::default());
    let (session, sink) = session_with(
        quiet_config(),
        transcriber.clone(),
        chat.clone(),
        Arc::new(ChunkedSynth::failing_after(2)),
    );

    speak_for(&session, 2000);
    wait_until(|| sink.count() >= 2).await;
    wait_until(|| !session.is_replying()).await;

    // Partial audio stands, history keeps both turns, and the next turn works.
    assert_eq!(sink.count(), 2);
    assert_eq!(session.history_snapshot().await.len(), 2);

    speak_for(&session, 2000);
    session.finish().await;
    assert_eq!(chat.call_count(), 2);
    assert_eq!(session.history_snapshot().await.len(), 4);
}

#[tokio::test(start_paused = true)]
async fn stray_end_of_speech_is_ignored() {
    let transcriber = Arc::new(CountingTranscriber::numbered());
    let (session, _sink) = session_with(
        quiet_config(),
        transcriber.clone(),
        Arc::new(EchoChat::default()),
        Arc::new(ChunkedSynth::quick()),
    );

    session.handle_vad_event(VadEvent::EndOfSpeech);
    session.finish().await;
    assert_eq!(transcriber.call_count(), 0);
}
