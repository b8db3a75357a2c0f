//! OpenAI-compatible speech-to-text over HTTP multipart.
//!
//! Works against `api.openai.com` and against self-hosted Whisper servers
//! that expose the same `/audio/transcriptions` surface.

use async_trait::async_trait;
use hound::{SampleFormat, WavSpec, WavWriter};
use serde::Deserialize;
use std::io::Cursor;
use voce_core::{Result, Transcriber, Transcription, VoiceError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "whisper-1";

/// Configuration for [`WhisperApiTranscriber`].
#[derive(Debug, Clone)]
pub struct WhisperApiConfig {
    /// Bearer token for the API.
    pub api_key: String,
    /// Transcription model identifier.
    pub model: String,
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Sample rate uploads are encoded at.
    pub sample_rate: u32,
}

impl WhisperApiConfig {
    /// Create a configuration with the given API key and defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            sample_rate: 16000,
        }
    }

    /// Read the configuration from the environment.
    ///
    /// Requires `OPENAI_API_KEY`; honors `VOCE_STT_MODEL` and
    /// `VOCE_STT_BASE_URL` overrides.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| VoiceError::config("OPENAI_API_KEY is not set"))?;
        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("VOCE_STT_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = std::env::var("VOCE_STT_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
    #[serde(default)]
    language: Option<String>,
}

/// Speech-to-text backend posting WAV uploads to an OpenAI-compatible API.
pub struct WhisperApiTranscriber {
    config: WhisperApiConfig,
    client: reqwest::Client,
}

impl WhisperApiTranscriber {
    /// Create a transcriber from a configuration.
    pub fn new(config: WhisperApiConfig) -> Self {
        Self { config, client: reqwest::Client::new() }
    }
}

#[async_trait]
impl Transcriber for WhisperApiTranscriber {
    fn name(&self) -> &str {
        "whisper-api"
    }

    fn input_sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    async fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<Transcription> {
        let wav = encode_wav(samples, sample_rate)?;
        let file = reqwest::multipart::Part::bytes(wav)
            .file_name("utterance.wav")
            .mime_str("audio/wav")
            .map_err(|e| VoiceError::transcription(format!("invalid upload part: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VoiceError::transcription(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::transcription(format!("HTTP {status}: {body}")));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::transcription(format!("invalid response: {e}")))?;
        Ok(Transcription { text: parsed.text, language: parsed.language })
    }
}

/// Encode mono f32 samples as a 16-bit PCM WAV file in memory.
fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec)
        .map_err(|e| VoiceError::audio(format!("wav header: {e}")))?;
    for &sample in samples {
        let pcm = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        writer.write_sample(pcm).map_err(|e| VoiceError::audio(format!("wav encode: {e}")))?;
    }
    writer.finalize().map_err(|e| VoiceError::audio(format!("wav finalize: {e}")))?;
    Ok(cursor.into_inner())
}
