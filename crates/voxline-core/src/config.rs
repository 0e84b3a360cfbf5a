//! Configuration types for the Voxline pipeline
//!
//! Everything the pipeline needs is carried by [`Config`]; nothing here reads
//! the process environment. Binaries decide where the values come from.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub transcoder: TranscoderConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }
}

/// Speech synthesis provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Subscription key sent with every request
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the provider API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Language used when a request does not name one
    #[serde(default = "default_language")]
    pub language: String,

    /// Speaker used when a request does not name one
    #[serde(default = "default_speaker")]
    pub speaker: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Sample rate requested from the provider
    #[serde(default = "default_speech_sample_rate")]
    pub speech_sample_rate: u32,

    #[serde(default = "default_enable_preprocessing")]
    pub enable_preprocessing: bool,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            language: default_language(),
            speaker: default_speaker(),
            model: default_model(),
            speech_sample_rate: default_speech_sample_rate(),
            enable_preprocessing: default_enable_preprocessing(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_base_url() -> String {
    "https://api.sarvam.ai".to_string()
}

fn default_language() -> String {
    "en-IN".to_string()
}

fn default_speaker() -> String {
    "anushka".to_string()
}

fn default_model() -> String {
    "bulbul:v2".to_string()
}

fn default_speech_sample_rate() -> u32 {
    8000
}

fn default_enable_preprocessing() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// External resampler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscoderConfig {
    /// Resampler binary, resolved through PATH when not absolute
    #[serde(default = "default_binary")]
    pub binary: PathBuf,

    /// Sample rate assumed for containerless (raw s16le) input
    #[serde(default = "default_raw_source_rate")]
    pub raw_source_rate: u32,

    /// Upper bound on a single resampler run; unbounded when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Directory for scratch files; the host temp dir when unset
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            raw_source_rate: default_raw_source_rate(),
            timeout_secs: None,
            scratch_dir: None,
        }
    }
}

impl TranscoderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

fn default_binary() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_raw_source_rate() -> u32 {
    24000
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,

    /// Duration of each µ-law frame returned by the frames endpoint
    #[serde(default = "default_frame_duration_ms")]
    pub frame_duration_ms: u32,

    /// Largest request body accepted, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: default_cors_enabled(),
            frame_duration_ms: default_frame_duration_ms(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_enabled() -> bool {
    true
}

fn default_frame_duration_ms() -> u32 {
    20
}

fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024
}
