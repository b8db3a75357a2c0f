//! Cartesia text-to-speech over streaming HTTP.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use serde_json::json;
use voce_core::{AudioChunk, AudioChunkStream, AudioFormat, Result, Synthesizer, VoiceError};

const DEFAULT_BASE_URL: &str = "https://api.cartesia.ai";
const DEFAULT_MODEL: &str = "sonic-multilingual";
const DEFAULT_VOICE_ID: &str = "a0e99841-438c-4a64-b679-ae501e7d6091";
const API_VERSION: &str = "2024-06-10";

/// Configuration for [`CartesiaSynthesizer`].
#[derive(Debug, Clone)]
pub struct CartesiaConfig {
    /// API key (`X-API-Key` header).
    pub api_key: String,
    /// Voice identifier.
    pub voice_id: String,
    /// Model identifier.
    pub model_id: String,
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Format of the raw PCM the API is asked to produce.
    pub output_format: AudioFormat,
}

impl CartesiaConfig {
    /// Create a configuration with the given API key and defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            model_id: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            output_format: AudioFormat::pcm16_24khz(),
        }
    }

    /// Read the configuration from the environment.
    ///
    /// Requires `CARTESIA_API_KEY`; honors a `CARTESIA_VOICE_ID` override.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("CARTESIA_API_KEY")
            .map_err(|_| VoiceError::config("CARTESIA_API_KEY is not set"))?;
        let mut config = Self::new(api_key);
        if let Ok(voice_id) = std::env::var("CARTESIA_VOICE_ID") {
            config.voice_id = voice_id;
        }
        Ok(config)
    }

    /// Set the voice identifier.
    pub fn with_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = voice_id.into();
        self
    }

    /// Set the output format.
    pub fn with_output_format(mut self, format: AudioFormat) -> Self {
        self.output_format = format;
        self
    }
}

/// Text-to-speech backend streaming raw PCM16 from Cartesia.
pub struct CartesiaSynthesizer {
    config: CartesiaConfig,
    client: reqwest::Client,
}

impl CartesiaSynthesizer {
    /// Create a synthesizer from a configuration.
    pub fn new(config: CartesiaConfig) -> Self {
        Self { config, client: reqwest::Client::new() }
    }
}

#[async_trait]
impl Synthesizer for CartesiaSynthesizer {
    fn name(&self) -> &str {
        &self.config.model_id
    }

    fn output_format(&self) -> AudioFormat {
        self.config.output_format
    }

    async fn synthesize(&self, text: &str) -> Result<AudioChunkStream> {
        let body = json!({
            "model_id": self.config.model_id,
            "transcript": text,
            "voice": { "mode": "id", "id": self.config.voice_id },
            "output_format": {
                "container": "raw",
                "encoding": "pcm_s16le",
                "sample_rate": self.config.output_format.sample_rate,
            },
        });

        let response = self
            .client
            .post(format!("{}/tts/bytes", self.config.base_url))
            .header("X-API-Key", &self.config.api_key)
            .header("Cartesia-Version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| VoiceError::synthesis(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::synthesis(format!("HTTP {status}: {body}")));
        }

        let format = self.config.output_format;
        let mut bytes_stream = response.bytes_stream();
        let stream = async_stream::try_stream! {
            let mut carry: Vec<u8> = Vec::new();
            while let Some(piece) = bytes_stream.next().await {
                let piece: Bytes =
                    piece.map_err(|e| VoiceError::synthesis(format!("stream error: {e}")))?;
                if let Some(chunk) = take_pcm16(&mut carry, &piece, format) {
                    yield chunk;
                }
            }
            if !carry.is_empty() {
                Err(VoiceError::synthesis("stream ended mid-sample"))?;
            }
        };
        Ok(Box::pin(stream))
    }
}

/// Append incoming bytes to the carry and split off every complete sample.
///
/// HTTP chunk boundaries can land in the middle of a 16-bit sample; the odd
/// byte stays in the carry for the next round.
fn take_pcm16(carry: &mut Vec<u8>, incoming: &[u8], format: AudioFormat) -> Option<AudioChunk> {
    carry.extend_from_slice(incoming);
    let usable = carry.len() - (carry.len() % 2);
    if usable == 0 {
        return None;
    }
    let rest = carry.split_off(usable);
    let chunk = AudioChunk::from_le_bytes(carry, format);
    *carry = rest;
    chunk
}
