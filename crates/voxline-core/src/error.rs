//! Error types for the Voxline telephony pipeline

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Upstream provider error{}: {message}", status_suffix(.status))]
    UpstreamProvider {
        status: Option<u16>,
        message: String,
    },

    #[error("Failed to start resampler: {0}")]
    SpawnFailure(#[source] std::io::Error),

    #[error("Resampler exited with {}: {stderr}", exit_description(.code))]
    SubprocessFailure { code: Option<i32>, stderr: String },

    #[error("Resampler exited successfully but produced no output at {0:?}")]
    OutputMissing(PathBuf),

    #[error("Resampler did not finish within {limit:?}")]
    Timeout { limit: Duration },

    #[error("Audio encoding error: {0}")]
    AudioError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Pipeline step an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Configuration,
    Provider,
    Transcode,
    Encode,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Configuration => "configuration",
            PipelineStage::Provider => "provider",
            PipelineStage::Transcode => "transcode",
            PipelineStage::Encode => "encode",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// The stage this error aborted
    pub fn stage(&self) -> PipelineStage {
        match self {
            Error::ConfigError(_) => PipelineStage::Configuration,
            Error::UpstreamProvider { .. } | Error::HttpError(_) | Error::SerializationError(_) => {
                PipelineStage::Provider
            }
            Error::SpawnFailure(_)
            | Error::SubprocessFailure { .. }
            | Error::OutputMissing(_)
            | Error::Timeout { .. }
            | Error::IoError(_) => PipelineStage::Transcode,
            Error::AudioError(_) => PipelineStage::Encode,
        }
    }

    /// Exit code of the resampler, when the failure came from one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::SubprocessFailure { code, .. } => *code,
            _ => None,
        }
    }
}
