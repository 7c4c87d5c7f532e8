//! ElevenLabs speech-to-text / text-to-speech client
//!
//! Thin collaborator wrappers: text in, text out (STT) and text in, audio
//! bytes out (TTS). Non-2xx responses surface as [`VoiceError::Api`] with
//! the provider status and body.

use crate::config::VoiceConfig;
use crate::error::VoiceError;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const STT_MODEL: &str = "eleven_multilingual_v2";
const TTS_MODEL: &str = "eleven_multilingual_v2";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Clone)]
pub struct ElevenLabsClient {
    config: VoiceConfig,
    client: Client,
}

impl ElevenLabsClient {
    /// Create a client. Returns None when no API key is configured, so the
    /// routes degrade to text-only responses.
    pub fn new(config: VoiceConfig) -> Option<Self> {
        config.api_key.as_ref()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .ok()?;
        Some(Self { config, client })
    }

    fn api_key(&self) -> Result<&str, VoiceError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(VoiceError::MissingApiKey)
    }

    /// Default voice used when the caller does not pick one
    pub fn default_voice(&self) -> &str {
        &self.config.voice_id
    }

    /// Transcribe an uploaded audio blob to text
    pub async fn transcribe(&self, audio: Bytes) -> Result<String, VoiceError> {
        let api_key = self.api_key()?;
        let url = format!("{}/v1/speech-to-text", self.config.base_url);

        let form = Form::new()
            .part("file", Part::stream(audio).file_name("audio.webm"))
            .text("model_id", STT_MODEL);

        debug!("Uploading audio for transcription");

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranscriptionResponse = response.json().await?;
        Ok(parsed.text)
    }

    /// Synthesize spoken audio for a short response sentence
    pub async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, VoiceError> {
        let api_key = self.api_key()?;
        let url = format!("{}/v1/text-to-speech/{}", self.config.base_url, voice_id);

        debug!("Synthesizing {} chars of speech", text.len());

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
            .json(&json!({ "text": text, "model_id": TTS_MODEL }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?)
    }
}

// ============================================================================
// Tests
// ============================================================================
