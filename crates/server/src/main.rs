//! Price Server - house price prediction service
//!
//! Loads the trained model artifact once at startup and serves
//! predictions, health checks and metrics over HTTP.

use anyhow::Result;
use predictor_lib::{
    predictor::CurrencyConverter, ModelState, PredictionService, StructuredLogger,
};
use price_server::{api, ServerConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting price-server");

    let config = ServerConfig::load()?;
    info!(
        instance = %config.instance_name,
        model_path = %config.model_path.display(),
        columns_path = %config.columns_path.display(),
        "Server configured"
    );

    let logger = StructuredLogger::new(&config.instance_name);

    // Model and columns load together; on failure every request gets a 500
    let state = ModelState::load(&config.artifact_config());
    match &state {
        ModelState::Loaded(artifact) => {
            logger.log_model_loaded(artifact.version(), artifact.kind(), artifact.schema().len())
        }
        ModelState::NotLoaded { reason } => logger.log_model_load_failed(reason),
    }

    let converter = CurrencyConverter::with_config(config.currency_config());
    let service = PredictionService::with_converter(state, converter).with_logger(logger.clone());
    let app_state = Arc::new(api::AppState::new(service));

    logger.log_startup(SERVICE_VERSION, config.port);
    api::serve(config.port, app_state).await?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
