//! LiveKit WebRTC transport for the voice session.
//!
//! This module bridges a LiveKit room to the pipeline: subscribed remote
//! audio tracks become [`voce_core::AudioFrame`] streams, and a published
//! local track backed by a [`NativeAudioSource`] becomes the session's
//! [`AudioSink`]. The subset of [`livekit`] and [`livekit_api`] types needed
//! to build an agent is re-exported, so downstream crates only need
//! `voce-agent` in their `Cargo.toml`.
//!
//! Requires the **`livekit`** Cargo feature:
//!
//! ```toml
//! [dependencies]
//! voce-agent = { version = "0.1", features = ["livekit"] }
//! ```

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use livekit::prelude::*;
use livekit::webrtc::audio_frame::AudioFrame as RtcAudioFrame;
use livekit::webrtc::audio_source::native::NativeAudioSource;
use livekit::webrtc::audio_source::AudioSourceOptions;
use livekit::webrtc::audio_stream::native::NativeAudioStream;
use std::borrow::Cow;
use tokio::sync::mpsc::UnboundedReceiver;
use voce_core::{AudioChunk, AudioFormat, AudioFrame, AudioSink, Result, VoiceError};

// Room and connection
pub use livekit::prelude::{
    ConnectionState, Room, RoomError, RoomEvent, RoomOptions, RoomResult,
};

// Participants and tracks
pub use livekit::options::TrackPublishOptions;
pub use livekit::prelude::{
    LocalAudioTrack, LocalParticipant, LocalTrack, Participant, RemoteAudioTrack,
    RemoteParticipant, RemoteTrack, Track, TrackKind, TrackSource,
};

// Authentication, re-exported from `livekit-api` so downstream consumers do
// not need a direct dependency on it.
pub use livekit_api::access_token::{AccessToken, VideoGrants};

/// Read a subscribed remote track as a stream of PCM frames.
///
/// LiveKit resamples to the requested rate and channel count, so the frames
/// arrive ready for the detector.
pub fn frame_stream(
    track: &RemoteAudioTrack,
    sample_rate: u32,
    num_channels: u32,
) -> impl Stream<Item = AudioFrame> + Send {
    NativeAudioStream::new(track.rtc_track(), sample_rate as i32, num_channels as i32).map(
        |frame| AudioFrame::new(frame.data.to_vec(), frame.sample_rate, frame.num_channels),
    )
}

/// Turn the room event channel into an explicit stream of subscribed remote
/// audio tracks.
///
/// Video tracks and other room events are skipped. The stream ends when the
/// room closes its event channel.
pub fn subscribed_audio_tracks(
    mut events: UnboundedReceiver<RoomEvent>,
) -> impl Stream<Item = (RemoteAudioTrack, RemoteParticipant)> + Send {
    async_stream::stream! {
        while let Some(event) = events.recv().await {
            if let RoomEvent::TrackSubscribed { track, publication: _, participant } = event {
                if let RemoteTrack::Audio(audio_track) = track {
                    yield (audio_track, participant);
                }
            }
        }
    }
}

/// [`AudioSink`] that captures synthesized chunks into a published LiveKit
/// audio track.
pub struct RoomSink {
    source: NativeAudioSource,
}

impl RoomSink {
    /// Wrap an already-published [`NativeAudioSource`].
    pub fn new(source: NativeAudioSource) -> Self {
        Self { source }
    }

    /// Create a source, publish it as the agent's voice track on `room`, and
    /// return the sink.
    pub async fn publish(room: &Room, format: AudioFormat) -> Result<Self> {
        let source = NativeAudioSource::new(
            AudioSourceOptions::default(),
            format.sample_rate,
            format.channels as u32,
            100, // queue_size_ms
        );
        let track = LocalAudioTrack::create_audio_track(
            "agent_voice",
            RtcAudioSource::Native(source.clone()),
        );
        room.local_participant()
            .publish_track(
                LocalTrack::Audio(track),
                TrackPublishOptions { source: TrackSource::Microphone, ..Default::default() },
            )
            .await
            .map_err(|e| VoiceError::transport(format!("publish failed: {e}")))?;
        Ok(Self::new(source))
    }
}

#[async_trait]
impl AudioSink for RoomSink {
    async fn write(&self, chunk: AudioChunk) -> Result<()> {
        let num_channels = chunk.format.channels.max(1) as u32;
        let samples_per_channel = chunk.samples.len() as u32 / num_channels;
        let frame = RtcAudioFrame {
            data: Cow::Borrowed(&chunk.samples),
            sample_rate: chunk.format.sample_rate,
            num_channels,
            samples_per_channel,
        };
        self.source
            .capture_frame(&frame)
            .await
            .map_err(|e| VoiceError::transport(format!("capture failed: {e}")))
    }
}
