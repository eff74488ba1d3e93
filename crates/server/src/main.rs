//! Prediction server - serves the job board prediction forms
//!
//! Loads every model artifact once at startup, then answers prediction,
//! health and metrics requests over HTTP.

use anyhow::Result;
use inference_lib::{
    ModelRegistry, PredictionMetrics, PredictionService, ServiceHealth, StructuredLogger,
};
use prediction_server::{api, config::ServerConfig};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting prediction-server");

    let config = ServerConfig::load()?;
    info!(
        instance = %config.instance_name,
        model_dir = %config.model_dir.display(),
        "Server configured"
    );

    let logger = StructuredLogger::new(&config.instance_name);
    let metrics = PredictionMetrics::new();

    // Loading completes before anything can serve
    let registry_config = config.registry_config();
    let registry = tokio::task::spawn_blocking(move || ModelRegistry::load_all(&registry_config))
        .await?;
    metrics.record_load_report(registry.load_report());
    logger.log_load_report(registry.load_report());

    let registry = Arc::new(registry);
    let health = Arc::new(ServiceHealth::new(registry.clone()));
    let service = Arc::new(PredictionService::new(registry.clone()).with_logger(logger.clone()));
    let app_state = Arc::new(api::AppState::new(service, health.clone()));

    let addr = config.listen_addr();
    logger.log_startup(SERVER_VERSION, &addr, registry.loaded_count());
    health.set_ready(true);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
    };
    api::serve(&addr, app_state, shutdown).await?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
