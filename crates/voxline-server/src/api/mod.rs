//! HTTP routes

mod speech;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use voxline_core::ServerConfig;

use crate::state::AppState;

pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/health", get(health))
        .route("/v1/audio/speech", post(speech::synthesize))
        .route("/v1/audio/speech/frames", post(speech::synthesize_frames))
        .route("/v1/audio/telephony", post(speech::telephony))
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if server.cors_enabled {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider": state.pipeline.provider_name(),
        "transcoder": state.transcoder,
    }))
}
