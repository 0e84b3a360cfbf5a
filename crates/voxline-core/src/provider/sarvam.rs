//! Sarvam text-to-speech client

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{SpeechProvider, SpeechRequest};
use crate::config::ProviderConfig;
use crate::error::{Error, Result};

/// Request body for `POST /text-to-speech`
#[derive(Debug, Serialize)]
pub struct SarvamRequest {
    pub inputs: Vec<String>,
    pub target_language_code: String,
    pub speaker: String,
    pub model: String,
    pub enable_preprocessing: bool,
    pub speech_sample_rate: u32,
}

/// Response body; each entry of `audios` is base64 audio
#[derive(Debug, Deserialize)]
pub struct SarvamResponse {
    #[serde(default)]
    pub audios: Vec<String>,
}

impl SarvamResponse {
    /// Decode the first audio payload
    pub fn into_audio(self) -> Result<Bytes> {
        let encoded = self
            .audios
            .into_iter()
            .next()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| Error::UpstreamProvider {
                status: None,
                message: "No audio data in response".to_string(),
            })?;

        let audio = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::UpstreamProvider {
                status: None,
                message: format!("Failed to decode audio: {}", e),
            })?;

        Ok(Bytes::from(audio))
    }
}

/// Client for the Sarvam TTS API
pub struct SarvamProvider {
    client: reqwest::Client,
    config: ProviderConfig,
    api_key: String,
}

impl SarvamProvider {
    /// Fails with a configuration error when no API key is set
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::ConfigError("Provider API key is not configured".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/text-to-speech", self.config.base_url.trim_end_matches('/'))
    }

    /// Fill provider defaults into a request body
    pub fn build_request(&self, request: &SpeechRequest) -> SarvamRequest {
        SarvamRequest {
            inputs: vec![request.text.clone()],
            target_language_code: request
                .language
                .clone()
                .unwrap_or_else(|| self.config.language.clone()),
            speaker: request
                .speaker
                .clone()
                .unwrap_or_else(|| self.config.speaker.clone()),
            model: self.config.model.clone(),
            enable_preprocessing: self.config.enable_preprocessing,
            speech_sample_rate: self.config.speech_sample_rate,
        }
    }
}

#[async_trait]
impl SpeechProvider for SarvamProvider {
    fn name(&self) -> &str {
        "sarvam"
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<Bytes> {
        let body = self.build_request(request);
        let preview: String = request.text.chars().take(50).collect();
        info!(speaker = %body.speaker, language = %body.target_language_code, "Synthesizing \"{}\"", preview);

        let response = self
            .client
            .post(self.endpoint())
            .header("api-subscription-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::UpstreamProvider {
                status: Some(status.as_u16()),
                message,
            });
        }

        let text = response.text().await?;
        let parsed: SarvamResponse = serde_json::from_str(&text).map_err(|e| Error::UpstreamProvider {
            status: Some(status.as_u16()),
            message: format!("Malformed response: {}", e),
        })?;

        let audio = parsed.into_audio()?;
        debug!("Provider returned {} bytes of audio", audio.len());
        Ok(audio)
    }
}
