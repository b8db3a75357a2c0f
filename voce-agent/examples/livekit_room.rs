//! Voice agent in a LiveKit room.
//!
//! Joins a room, publishes a voice track, and converses with the first
//! participant whose audio track it subscribes to.
//!
//! # Prerequisites
//!
//! - Set `LIVEKIT_URL`, `LIVEKIT_API_KEY`, and `LIVEKIT_API_SECRET`.
//! - Set `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, and `CARTESIA_API_KEY`.
//! - Optionally set `LIVEKIT_ROOM` (defaults to `voce`).
//! - Run with: `cargo run --example livekit_room --features livekit`

use futures::StreamExt;
use std::sync::Arc;
use voce_agent::livekit::{
    frame_stream, subscribed_audio_tracks, AccessToken, Room, RoomOptions, RoomSink, VideoGrants,
};
use voce_agent::providers::{
    AnthropicChatModel, AnthropicConfig, CartesiaConfig, CartesiaSynthesizer, WhisperApiConfig,
    WhisperApiTranscriber,
};
use voce_agent::{AgentConfig, EnergyVad, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let url = std::env::var("LIVEKIT_URL")?;
    let api_key = std::env::var("LIVEKIT_API_KEY")?;
    let api_secret = std::env::var("LIVEKIT_API_SECRET")?;
    let room_name = std::env::var("LIVEKIT_ROOM").unwrap_or_else(|_| "voce".to_string());

    let token = AccessToken::with_api_key(&api_key, &api_secret)
        .with_identity("voce-agent")
        .with_grants(VideoGrants { room_join: true, room: room_name.clone(), ..Default::default() })
        .to_jwt()?;

    let (room, events) = Room::connect(&url, &token, RoomOptions::default()).await?;
    tracing::info!(room = %room.name(), "connected");

    let config = AgentConfig::default();
    let sink = Arc::new(RoomSink::publish(&room, config.output_format).await?);

    let session = Session::builder()
        .config(config)
        .transcriber(Arc::new(WhisperApiTranscriber::new(WhisperApiConfig::from_env()?)))
        .chat_model(Arc::new(AnthropicChatModel::new(AnthropicConfig::from_env()?)))
        .synthesizer(Arc::new(CartesiaSynthesizer::new(CartesiaConfig::from_env()?)))
        .sink(sink)
        .build()?;

    let mut tracks = std::pin::pin!(subscribed_audio_tracks(events));
    if let Some((track, participant)) = tracks.next().await {
        tracing::info!(participant = ?participant.identity(), "subscribed to audio track");
        let frames = frame_stream(&track, 48000, 1);
        session.run(frames, Box::new(EnergyVad::new())).await?;
    }

    session.close().await;
    Ok(())
}
