//! Provider → sniff → resample → µ-law
//!
//! Each call runs the stages strictly in order and either returns a complete
//! buffer or the first error. Nothing is retried.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::audio::{classify, mulaw, AudioEncoder, EncodedAudio, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::provider::{SarvamProvider, SpeechProvider, SpeechRequest};
use crate::transcode::{FfmpegTranscoder, Transcoder};

/// Turns synthesized speech into 8 kHz µ-law for voice calls
#[derive(Clone)]
pub struct TelephonyPipeline {
    provider: Arc<dyn SpeechProvider>,
    transcoder: Arc<dyn Transcoder>,
    encoder: AudioEncoder,
}

impl TelephonyPipeline {
    pub fn new(provider: Arc<dyn SpeechProvider>, transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            provider,
            transcoder,
            encoder: AudioEncoder::new(),
        }
    }

    /// Build the production pipeline: Sarvam provider and ffmpeg resampler
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = SarvamProvider::new(config.provider.clone())?;
        let transcoder = FfmpegTranscoder::new(&config.transcoder);
        Ok(Self::new(Arc::new(provider), Arc::new(transcoder)))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Normalize provider audio to 8 kHz s16le PCM
    pub async fn normalize(&self, audio: &[u8]) -> Result<Vec<u8>> {
        let format = classify(audio);
        debug!("Detected {} input ({} bytes)", format, audio.len());
        self.transcoder.normalize(audio, format).await
    }

    /// Post-process audio that is already in hand into µ-law
    pub async fn postprocess(&self, audio: &[u8]) -> Result<Vec<u8>> {
        let pcm = self.normalize(audio).await?;
        let encoded = mulaw::encode(&pcm);
        debug!(
            "Encoded {} PCM bytes to {} µ-law bytes",
            pcm.len(),
            encoded.len()
        );
        Ok(encoded)
    }

    /// Synthesize `request` and return 8 kHz µ-law
    pub async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let audio = self.fetch(request).await?;
        self.postprocess(&audio).await.map_err(|e| {
            warn!(stage = %e.stage(), "Post-processing failed: {}", e);
            e
        })
    }

    /// Synthesize `request` and package it as `format`
    pub async fn render(&self, request: &SpeechRequest, format: OutputFormat) -> Result<EncodedAudio> {
        let audio = self.fetch(request).await?;
        let pcm = self.normalize(&audio).await?;
        let encoded = self.encoder.encode(&pcm, format)?;
        info!(
            format = format.as_str(),
            bytes = encoded.data.len(),
            duration_ms = encoded.duration_ms,
            "Rendered speech"
        );
        Ok(encoded)
    }

    async fn fetch(&self, request: &SpeechRequest) -> Result<bytes::Bytes> {
        let audio = self.provider.synthesize(request).await.map_err(|e| {
            warn!(provider = self.provider.name(), "Synthesis failed: {}", e);
            e
        })?;
        info!(
            provider = self.provider.name(),
            "Received {} bytes of audio",
            audio.len()
        );
        Ok(audio)
    }
}
