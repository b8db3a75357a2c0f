//! Audio frames, speech segments and sample-rate conversion.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// PCM16 audio format descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Sample rate in Hz (e.g., 48000, 24000, 16000).
    pub sample_rate: u32,
    /// Number of audio channels (1 = mono, 2 = stereo).
    pub channels: u8,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::pcm16_24khz()
    }
}

impl AudioFormat {
    /// Create a new audio format descriptor.
    pub fn new(sample_rate: u32, channels: u8) -> Self {
        Self { sample_rate, channels }
    }

    /// Mono PCM16 at 48kHz (typical WebRTC capture rate).
    pub fn pcm16_48khz() -> Self {
        Self { sample_rate: 48000, channels: 1 }
    }

    /// Mono PCM16 at 24kHz (TTS output default).
    pub fn pcm16_24khz() -> Self {
        Self { sample_rate: 24000, channels: 1 }
    }

    /// Mono PCM16 at 16kHz (transcription input default).
    pub fn pcm16_16khz() -> Self {
        Self { sample_rate: 16000, channels: 1 }
    }

    /// Samples per second across all channels.
    pub fn samples_per_second(&self) -> u32 {
        self.sample_rate * self.channels as u32
    }

    /// Duration in milliseconds for a given number of samples.
    pub fn duration_ms(&self, samples: usize) -> f64 {
        samples as f64 * 1000.0 / self.samples_per_second() as f64
    }
}

/// A chunk of synthesized PCM16 audio on its way to the output sink.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// PCM16 samples, interleaved if multi-channel.
    pub samples: Vec<i16>,
    /// Format of this chunk.
    pub format: AudioFormat,
}

impl AudioChunk {
    /// Create a new audio chunk.
    pub fn new(samples: Vec<i16>, format: AudioFormat) -> Self {
        Self { samples, format }
    }

    /// Duration of this chunk in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        self.format.duration_ms(self.samples.len())
    }

    /// Decode little-endian PCM16 bytes into a chunk.
    ///
    /// Returns `None` if the byte count is odd (not valid PCM16).
    pub fn from_le_bytes(data: &[u8], format: AudioFormat) -> Option<Self> {
        if data.len() % 2 != 0 {
            return None;
        }
        let mut samples = Vec::with_capacity(data.len() / 2);
        for pair in data.chunks_exact(2) {
            samples.push(i16::from_le_bytes([pair[0], pair[1]]));
        }
        Some(Self::new(samples, format))
    }

    /// Encode the samples as little-endian PCM16 bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.samples.len() * 2);
        for sample in &self.samples {
            data.extend_from_slice(&sample.to_le_bytes());
        }
        data
    }
}

/// One frame of PCM16 audio as delivered by a transport.
///
/// Frames are transient: each is either copied into the segment buffer or
/// dropped after the voice detector has seen it.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// PCM16 samples, interleaved if multi-channel.
    pub samples: Vec<i16>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels.
    pub num_channels: u32,
}

impl AudioFrame {
    /// Create a new frame.
    pub fn new(samples: Vec<i16>, sample_rate: u32, num_channels: u32) -> Self {
        Self { samples, sample_rate, num_channels }
    }

    /// Number of samples per channel.
    pub fn samples_per_channel(&self) -> usize {
        self.samples.len() / self.num_channels.max(1) as usize
    }

    /// Frame duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples_per_channel() as f64 / self.sample_rate as f64
    }

    /// Mono f32 samples in [-1.0, 1.0], downmixing channels by averaging.
    pub fn to_mono_f32(&self) -> Vec<f32> {
        let channels = self.num_channels.max(1) as usize;
        let mut mono = Vec::with_capacity(self.samples.len() / channels);
        for group in self.samples.chunks_exact(channels) {
            let sum: f32 = group.iter().map(|s| *s as f32 / 32768.0).sum();
            mono.push(sum / channels as f32);
        }
        mono
    }
}

/// Resample by nearest-index selection.
///
/// Lossy for anything other than integer ratios, but cheap and good enough
/// for speech headed into a transcription model. Quality-sensitive paths
/// should resample upstream.
pub fn resample_nearest(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if input.is_empty() || from_rate == to_rate {
        return input.to_vec();
    }
    let out_len = (input.len() as u64 * to_rate as u64 / from_rate as u64) as usize;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let src = (i as u64 * from_rate as u64 / to_rate as u64) as usize;
        out.push(input[src.min(input.len() - 1)]);
    }
    out
}

/// An utterance: the frames collected between start- and end-of-speech.
///
/// Owned by the turn that produced it and consumed by transcription.
#[derive(Debug, Clone, Default)]
pub struct SpeechSegment {
    frames: Vec<AudioFrame>,
}

impl SpeechSegment {
    /// Whether the segment holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of frames in the segment.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Sample rate of the source frames, if any.
    pub fn source_sample_rate(&self) -> Option<u32> {
        self.frames.first().map(|f| f.sample_rate)
    }

    /// Total duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames.iter().map(|f| f.duration_secs()).sum()
    }

    /// Concatenate all frames into one mono f32 waveform at `target_rate`.
    pub fn resampled_mono(&self, target_rate: u32) -> Vec<f32> {
        let Some(source_rate) = self.source_sample_rate() else {
            return Vec::new();
        };
        let mut mono = Vec::new();
        for frame in &self.frames {
            mono.extend(frame.to_mono_f32());
        }
        resample_nearest(&mono, source_rate, target_rate)
    }
}

/// Frame buffer the accumulator fills while the user is speaking.
///
/// Capped at a maximum buffered duration so a detector that never reports
/// end-of-speech cannot grow the buffer without bound; overflow frames are
/// dropped with a single warning per segment.
#[derive(Debug)]
pub struct SegmentBuffer {
    frames: Vec<AudioFrame>,
    buffered_secs: f64,
    max_secs: f64,
    overflowed: bool,
}

impl SegmentBuffer {
    /// Create a buffer that holds at most `max_duration` of audio.
    pub fn new(max_duration: Duration) -> Self {
        Self {
            frames: Vec::new(),
            buffered_secs: 0.0,
            max_secs: max_duration.as_secs_f64(),
            overflowed: false,
        }
    }

    /// Append a frame. Returns `false` if the cap has been reached and the
    /// frame was dropped.
    pub fn push(&mut self, frame: AudioFrame) -> bool {
        if self.buffered_secs >= self.max_secs {
            if !self.overflowed {
                self.overflowed = true;
                tracing::warn!(
                    buffered_secs = self.buffered_secs,
                    "segment buffer full, dropping frames until end of speech"
                );
            }
            return false;
        }
        self.buffered_secs += frame.duration_secs();
        self.frames.push(frame);
        true
    }

    /// Whether the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Duration currently buffered, in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.buffered_secs
    }

    /// Swap the contents out as a segment, leaving the buffer empty.
    pub fn take(&mut self) -> SpeechSegment {
        self.buffered_secs = 0.0;
        self.overflowed = false;
        SpeechSegment { frames: std::mem::take(&mut self.frames) }
    }

    /// Discard everything buffered so far.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.buffered_secs = 0.0;
        self.overflowed = false;
    }
}
