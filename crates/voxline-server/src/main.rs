//! Voxline Server - HTTP API for telephony-ready speech

use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod error;
mod settings;
mod state;

use state::{AppState, TranscoderStatus};
use voxline_core::{
    FfmpegTranscoder, SarvamProvider, SpeechProvider, TelephonyPipeline, UnconfiguredProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "voxline_server=debug,voxline_core=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Voxline server");

    let config = settings::load()?;

    let provider: Arc<dyn SpeechProvider> = match SarvamProvider::new(config.provider.clone()) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            warn!("Speech synthesis disabled: {}", e);
            Arc::new(UnconfiguredProvider::new(e.to_string()))
        }
    };

    let transcoder = FfmpegTranscoder::new(&config.transcoder);
    let available = transcoder.probe().await;
    if available {
        info!("Resampler found: {:?}", transcoder.binary());
    } else {
        warn!(
            "Resampler {:?} could not be started; conversions will fail",
            transcoder.binary()
        );
    }
    let status = TranscoderStatus {
        binary: transcoder.binary().display().to_string(),
        available,
    };

    let pipeline = TelephonyPipeline::new(provider, Arc::new(transcoder));
    let state = AppState::new(pipeline, status, config.server.frame_duration_ms);

    // Build router
    let app = api::create_router(state, &config.server);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
