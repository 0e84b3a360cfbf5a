//! Normalization of provider audio to mono 8 kHz s16le PCM
//!
//! The pipeline only sees the [`Transcoder`] trait. [`FfmpegTranscoder`] is the
//! production implementation and runs one `ffmpeg` process per call.

mod ffmpeg;

pub use ffmpeg::FfmpegTranscoder;

use async_trait::async_trait;

use crate::audio::AudioFormatTag;
use crate::error::Result;

/// Converts arbitrary audio into mono 8 kHz s16le PCM
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// `hint` comes from sniffing and is not trusted beyond choosing input flags
    async fn normalize(&self, audio: &[u8], hint: AudioFormatTag) -> Result<Vec<u8>>;
}
