//! Application state management

use serde::Serialize;
use voxline_core::TelephonyPipeline;

/// Resampler status captured at startup
#[derive(Debug, Clone, Serialize)]
pub struct TranscoderStatus {
    pub binary: String,
    pub available: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: TelephonyPipeline,
    pub transcoder: TranscoderStatus,
    pub frame_duration_ms: u32,
}

impl AppState {
    pub fn new(
        pipeline: TelephonyPipeline,
        transcoder: TranscoderStatus,
        frame_duration_ms: u32,
    ) -> Self {
        Self {
            pipeline,
            transcoder,
            frame_duration_ms,
        }
    }
}
