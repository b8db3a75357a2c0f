//! Reply streaming, supersession and barge-in.

mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use voce_core::{AgentConfig, VadEvent};

fn quiet_config() -> AgentConfig {
    AgentConfig::new().without_greeting()
}

#[tokio::test(start_paused = true)]
async fn barge_in_stops_chunk_forwarding() {
    let (session, sink) = session_with(
        quiet_config(),
        Arc::new(CountingTranscriber::fixed("hello")),
        Arc::new(EchoChat::default()),
        Arc::new(ChunkedSynth::new(100, Duration::from_millis(50))),
    );

    speak_for(&session, 2000);
    wait_until(|| sink.count() >= 2).await;
    assert!(session.is_replying());

    session.handle_vad_event(VadEvent::StartOfSpeech);
    wait_until(|| !session.is_replying()).await;

    // Once the reply has reached its cancelled state, nothing more arrives.
    let count = sink.count();
    assert!(count < 100);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(sink.count(), count);

    // Barge-in never touches the history.
    assert_eq!(session.history_snapshot().await.len(), 2);
    session.finish().await;
}

#[tokio::test(start_paused = true)]
async fn new_reply_supersedes_the_old_one() {
    let (session, sink) = session_with(
        quiet_config(),
        Arc::new(CountingTranscriber::numbered()),
        Arc::new(EchoChat::default()),
        Arc::new(ChunkedSynth::new(20, Duration::from_millis(10))),
    );

    let first = session.start_reply("one".into());
    wait_until(|| sink.count() >= 2).await;

    let second = session.start_reply("two".into());
    second.finished().await;
    assert!(first.is_finished());

    // The old reply reaches its cancelled-or-finished state before any new
    // chunk goes out: tags never interleave.
    let tags = sink.tags();
    assert!(tags.contains(&2));
    let first_new = tags.iter().position(|&t| t == 2).unwrap();
    assert!(tags[first_new..].iter().all(|&t| t == 2));
    assert!(tags[..first_new].iter().all(|&t| t == 1));

    session.finish().await;
}

#[tokio::test(start_paused = true)]
async fn say_waits_for_the_whole_reply() {
    let (session, sink) = session_with(
        quiet_config(),
        Arc::new(CountingTranscriber::numbered()),
        Arc::new(EchoChat::default()),
        Arc::new(ChunkedSynth::quick()),
    );

    session.say("announcement").await;
    assert_eq!(sink.count(), 3);
    assert!(!session.is_replying());
    session.finish().await;
}

#[tokio::test(start_paused = true)]
async fn cancelled_handle_resolves() {
    let (session, _sink) = session_with(
        quiet_config(),
        Arc::new(CountingTranscriber::numbered()),
        Arc::new(EchoChat::default()),
        Arc::new(ChunkedSynth::new(50, Duration::from_millis(20))),
    );

    let reply = session.start_reply("long reply".into());
    reply.cancel();
    reply.finished().await;
    assert!(reply.is_finished());
    session.finish().await;
}

#[tokio::test(start_paused = true)]
async fn interrupt_without_reply_is_a_noop() {
    let (session, sink) = session_with(
        quiet_config(),
        Arc::new(CountingTranscriber::numbered()),
        Arc::new(EchoChat::default()),
        Arc::new(ChunkedSynth::quick()),
    );

    session.interrupt();
    assert!(!session.is_replying());
    assert_eq!(sink.count(), 0);
    session.finish().await;
}
