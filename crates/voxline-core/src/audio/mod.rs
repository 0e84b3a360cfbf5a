//! Audio classification, encoding and framing for telephony output

mod encoder;
mod format;
pub mod mulaw;
mod streaming;

pub use encoder::{AudioEncoder, EncodedAudio, OutputFormat, TELEPHONY_SAMPLE_RATE};
pub use format::{classify, AudioFormatTag};
pub use mulaw::MULAW_SILENCE;
pub use streaming::{frame_audio, FrameBuffer, FrameConfig};
