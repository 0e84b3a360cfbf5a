//! Fixed-duration framing of µ-law output for media-stream transports

use std::collections::VecDeque;
use tracing::debug;

use super::encoder::TELEPHONY_SAMPLE_RATE;
use super::mulaw::MULAW_SILENCE;

/// Configuration for framing encoded audio
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Frame duration in milliseconds
    pub frame_duration_ms: u32,
    /// Pad the final short frame with silence
    pub pad_final_frame: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frame_duration_ms: 20,
            pad_final_frame: true,
        }
    }
}

impl FrameConfig {
    /// Bytes per frame; µ-law is one byte per sample
    pub fn frame_len(&self) -> usize {
        ((TELEPHONY_SAMPLE_RATE as u64 * self.frame_duration_ms as u64) / 1000).max(1) as usize
    }
}

/// Buffer that slices µ-law bytes into equal frames
pub struct FrameBuffer {
    config: FrameConfig,
    pending: VecDeque<u8>,
    frames_emitted: usize,
}

impl FrameBuffer {
    pub fn new(config: FrameConfig) -> Self {
        Self {
            config,
            pending: VecDeque::new(),
            frames_emitted: 0,
        }
    }

    /// Add encoded bytes to the buffer
    pub fn push(&mut self, data: &[u8]) {
        self.pending.extend(data);
    }

    /// Check if a full frame is available
    pub fn can_emit_frame(&self) -> bool {
        self.pending.len() >= self.config.frame_len()
    }

    /// Take one full frame
    pub fn take_frame(&mut self) -> Option<Vec<u8>> {
        let frame_len = self.config.frame_len();
        if self.pending.len() < frame_len {
            return None;
        }

        self.frames_emitted += 1;
        Some(self.pending.drain(..frame_len).collect())
    }

    /// Take whatever is left, padded to a full frame if configured
    pub fn take_remaining(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            return None;
        }

        let mut frame: Vec<u8> = self.pending.drain(..).collect();
        if self.config.pad_final_frame {
            frame.resize(self.config.frame_len(), MULAW_SILENCE);
        }
        self.frames_emitted += 1;
        Some(frame)
    }

    /// Drain everything into frames
    pub fn drain_frames(&mut self) -> Vec<Vec<u8>> {
        let mut frames = Vec::with_capacity(self.pending.len() / self.config.frame_len() + 1);
        while let Some(frame) = self.take_frame() {
            frames.push(frame);
        }
        if let Some(last) = self.take_remaining() {
            frames.push(last);
        }
        debug!(
            "Framed audio into {} frames of {} ms",
            frames.len(),
            self.config.frame_duration_ms
        );
        frames
    }

    pub fn frames_emitted(&self) -> usize {
        self.frames_emitted
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Split encoded audio into frames in one call
pub fn frame_audio(data: &[u8], config: FrameConfig) -> Vec<Vec<u8>> {
    let mut buffer = FrameBuffer::new(config);
    buffer.push(data);
    buffer.drain_frames()
}
