//! Speech synthesis providers

mod sarvam;

pub use sarvam::{SarvamProvider, SarvamRequest, SarvamResponse};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Text plus an optional voice selection; unset fields fall back to provider defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub speaker: Option<String>,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }
}

/// Remote synthesis service returning audio of unspecified encoding
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn synthesize(&self, request: &SpeechRequest) -> Result<Bytes>;
}

/// Stand-in used when no provider could be configured; every call fails with
/// the configuration error that prevented setup
pub struct UnconfiguredProvider {
    reason: String,
}

impl UnconfiguredProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl SpeechProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn synthesize(&self, _request: &SpeechRequest) -> Result<Bytes> {
        Err(Error::ConfigError(self.reason.clone()))
    }
}
