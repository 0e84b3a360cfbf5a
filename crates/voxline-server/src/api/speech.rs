//! Speech endpoints
//!
//! Synthesizes text through the configured provider, or post-processes
//! caller-supplied audio, and returns 8 kHz telephony audio.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderName},
    response::{IntoResponse, Response},
    Json,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::info;
use voxline_core::audio::{frame_audio, FrameConfig, TELEPHONY_SAMPLE_RATE};
use voxline_core::{OutputFormat, SpeechRequest};

use crate::error::ApiError;
use crate::state::AppState;

const SAMPLE_RATE_HEADER: HeaderName = HeaderName::from_static("x-sample-rate");

/// Speech request
#[derive(Debug, Deserialize)]
pub struct SpeechBody {
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub format: OutputFormat,
}

impl SpeechBody {
    fn to_request(&self) -> Result<SpeechRequest, ApiError> {
        if self.text.trim().is_empty() {
            return Err(ApiError::bad_request("text must not be empty"));
        }
        Ok(SpeechRequest {
            text: self.text.clone(),
            language: self.language.clone(),
            speaker: self.speaker.clone(),
        })
    }
}

/// Framed µ-law response
#[derive(Debug, Serialize)]
pub struct FramesResponse {
    pub format: &'static str,
    pub sample_rate: u32,
    pub frame_duration_ms: u32,
    pub frames: Vec<String>,
}

/// POST /v1/audio/speech
pub async fn synthesize(
    State(state): State<AppState>,
    Json(body): Json<SpeechBody>,
) -> Result<Response, ApiError> {
    let request = body.to_request()?;
    let audio = state.pipeline.render(&request, body.format).await?;

    info!(
        "Returning {} bytes of {} ({:.0} ms)",
        audio.data.len(),
        audio.format.as_str(),
        audio.duration_ms
    );
    Ok(audio_response(audio.format.content_type(), audio.data))
}

/// POST /v1/audio/speech/frames
pub async fn synthesize_frames(
    State(state): State<AppState>,
    Json(body): Json<SpeechBody>,
) -> Result<Json<FramesResponse>, ApiError> {
    let request = body.to_request()?;
    let ulaw = state.pipeline.synthesize(&request).await?;

    let config = FrameConfig {
        frame_duration_ms: state.frame_duration_ms,
        ..Default::default()
    };
    let engine = base64::engine::general_purpose::STANDARD;
    let frames = frame_audio(&ulaw, config)
        .iter()
        .map(|frame| engine.encode(frame))
        .collect();

    Ok(Json(FramesResponse {
        format: OutputFormat::Mulaw.as_str(),
        sample_rate: TELEPHONY_SAMPLE_RATE,
        frame_duration_ms: state.frame_duration_ms,
        frames,
    }))
}

/// POST /v1/audio/telephony
pub async fn telephony(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("request body must contain audio"));
    }

    let ulaw = state.pipeline.postprocess(&body).await?;
    Ok(audio_response(OutputFormat::Mulaw.content_type(), ulaw))
}

fn audio_response(content_type: &'static str, data: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (SAMPLE_RATE_HEADER, TELEPHONY_SAMPLE_RATE.to_string()),
        ],
        data,
    )
        .into_response()
}
