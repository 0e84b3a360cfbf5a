//! Packaging of normalized 8 kHz PCM into deliverable formats

use hound::{WavSpec, WavWriter};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::str::FromStr;
use tracing::debug;

use super::mulaw;
use crate::error::{Error, Result};

/// Sample rate of every telephony output
pub const TELEPHONY_SAMPLE_RATE: u32 = 8000;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// G.711 µ-law, one byte per sample
    #[default]
    #[serde(rename = "ulaw_8000")]
    Mulaw,
    /// Raw s16le samples
    #[serde(rename = "pcm_8000")]
    Pcm16,
    /// s16le samples in a WAV container
    #[serde(rename = "wav_8000")]
    Wav,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Mulaw => "ulaw_8000",
            OutputFormat::Pcm16 => "pcm_8000",
            OutputFormat::Wav => "wav_8000",
        }
    }

    /// Get content type for format
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Mulaw => "audio/basic",
            OutputFormat::Pcm16 => "application/octet-stream",
            OutputFormat::Wav => "audio/wav",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ulaw_8000" | "mulaw" | "ulaw" => Ok(OutputFormat::Mulaw),
            "pcm_8000" | "pcm" => Ok(OutputFormat::Pcm16),
            "wav_8000" | "wav" => Ok(OutputFormat::Wav),
            other => Err(Error::ConfigError(format!("Unsupported output format: {}", other))),
        }
    }
}

/// Audio in its final form
#[derive(Debug, Clone)]
pub struct EncodedAudio {
    pub data: Vec<u8>,
    pub format: OutputFormat,
    pub sample_count: usize,
    pub duration_ms: f32,
}

impl EncodedAudio {
    pub fn new(data: Vec<u8>, format: OutputFormat, sample_count: usize) -> Self {
        let duration_ms = (sample_count as f32 / TELEPHONY_SAMPLE_RATE as f32) * 1000.0;
        Self {
            data,
            format,
            sample_count,
            duration_ms,
        }
    }
}

/// Encoder for mono 8 kHz s16le PCM
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioEncoder;

impl AudioEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode normalized PCM to the specified format
    pub fn encode(&self, pcm: &[u8], format: OutputFormat) -> Result<EncodedAudio> {
        let sample_count = pcm.len() / 2;
        let data = match format {
            OutputFormat::Mulaw => mulaw::encode(pcm),
            OutputFormat::Pcm16 => pcm[..sample_count * 2].to_vec(),
            OutputFormat::Wav => self.encode_wav(pcm)?,
        };

        debug!(
            "Encoded {} samples to {} ({} bytes)",
            sample_count,
            format.as_str(),
            data.len()
        );
        Ok(EncodedAudio::new(data, format, sample_count))
    }

    /// Encode to WAV format
    fn encode_wav(&self, pcm: &[u8]) -> Result<Vec<u8>> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: TELEPHONY_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer =
                WavWriter::new(&mut buffer, spec).map_err(|e| Error::AudioError(e.to_string()))?;

            for pair in pcm.chunks_exact(2) {
                writer
                    .write_sample(i16::from_le_bytes([pair[0], pair[1]]))
                    .map_err(|e| Error::AudioError(e.to_string()))?;
            }

            writer
                .finalize()
                .map_err(|e| Error::AudioError(e.to_string()))?;
        }

        Ok(buffer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_mulaw_output_is_half_length() {
        let encoded = AudioEncoder::new()
            .encode(&pcm(&[0; 800]), OutputFormat::Mulaw)
            .unwrap();
        assert_eq!(encoded.data.len(), 800);
        assert_eq!(encoded.sample_count, 800);
        assert!((encoded.duration_ms - 100.0).abs() < f32::EPSILON);
        assert!(encoded.data.iter().all(|&b| b == mulaw::MULAW_SILENCE));
    }

    #[test]
    fn test_pcm_passthrough_truncates_odd_byte() {
        let mut input = pcm(&[1, 2, 3]);
        input.push(0xAA);
        let encoded = AudioEncoder::new()
            .encode(&input, OutputFormat::Pcm16)
            .unwrap();
        assert_eq!(encoded.data, pcm(&[1, 2, 3]));
    }

    #[test]
    fn test_wav_is_readable_at_8khz_mono() {
        let samples = [0i16, 1000, -1000, 32767];
        let encoded = AudioEncoder::new()
            .encode(&pcm(&samples), OutputFormat::Wav)
            .unwrap();
        assert_eq!(&encoded.data[..4], b"RIFF");

        let mut reader = hound::WavReader::new(Cursor::new(encoded.data)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 8000);
        assert_eq!(spec.channels, 1);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_format_names() {
        assert_eq!("ulaw_8000".parse::<OutputFormat>().unwrap(), OutputFormat::Mulaw);
        assert_eq!("wav".parse::<OutputFormat>().unwrap(), OutputFormat::Wav);
        assert!("mp3_44100".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Mulaw);
        assert_eq!(
            serde_json::from_str::<OutputFormat>("\"pcm_8000\"").unwrap(),
            OutputFormat::Pcm16
        );
        assert_eq!(OutputFormat::Mulaw.content_type(), "audio/basic");
    }
}
