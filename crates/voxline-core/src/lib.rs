//! Voxline Core - telephony post-processing for synthesized speech
//!
//! Speech providers hand back audio in whatever container and sample rate
//! they like. This crate turns it into 8 kHz mono G.711 µ-law, the format
//! voice-call transports expect.
//!
//! # Architecture
//!
//! - [`audio::classify`] sniffs the container from leading bytes
//! - [`transcode::Transcoder`] resamples to mono 8 kHz s16le
//!   ([`transcode::FfmpegTranscoder`] shells out to `ffmpeg`)
//! - [`audio::mulaw`] companding, bit-exact with the G.711 table
//! - [`TelephonyPipeline`] runs a provider and the three steps in order
//!
//! # Example
//!
//! ```ignore
//! use voxline_core::{Config, SpeechRequest, TelephonyPipeline};
//!
//! let config = Config::load("voxline.toml".as_ref())?;
//! let pipeline = TelephonyPipeline::from_config(&config)?;
//!
//! let ulaw = pipeline.synthesize(&SpeechRequest::new("Hello, world!")).await?;
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod provider;
pub mod transcode;

pub use audio::{AudioFormatTag, EncodedAudio, OutputFormat};
pub use config::{Config, ProviderConfig, ServerConfig, TranscoderConfig};
pub use error::{Error, PipelineStage, Result};
pub use pipeline::TelephonyPipeline;
pub use provider::{SarvamProvider, SpeechProvider, SpeechRequest, UnconfiguredProvider};
pub use transcode::{FfmpegTranscoder, Transcoder};
