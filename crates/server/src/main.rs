//! Survival prediction server
//!
//! Serves the Titanic survival classifier behind a small HTTP API with
//! Prometheus instrumentation and health probes.

use anyhow::Result;
use serving_lib::{
    health::{components, HealthRegistry},
    Classifier, OnnxClassifier, PlaceholderForest, PredictionMetrics, ProcessStatsReader,
    StructuredLogger,
};
use std::sync::Arc;
use survival_server::api::{self, AppState};
use survival_server::config::ServerConfig;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting survival-server");

    let config = ServerConfig::load()?;
    info!(
        port = config.bind_port,
        strict_features = config.strict_features,
        "Server configured"
    );

    let health = HealthRegistry::new();
    health.register(components::INFERENCE).await;
    health.register(components::SYSTEM_STATS).await;

    let metrics = PredictionMetrics::new();

    let stats = Arc::new(ProcessStatsReader::new());
    if let Err(err) = stats.sample().await {
        warn!(error = %err, "Process stats unavailable");
        health
            .set_degraded(components::SYSTEM_STATS, "procfs not readable")
            .await;
    }

    let classifier: Arc<dyn Classifier> = match &config.model_path {
        Some(path) => match OnnxClassifier::from_path(path) {
            Ok(model) => {
                info!(path = %path, version = %model.model_version(), "Loaded model artifact");
                Arc::new(model)
            }
            Err(err) => {
                warn!(error = %err, path = %path, "Falling back to placeholder model");
                health
                    .set_degraded(components::INFERENCE, "model artifact load failed")
                    .await;
                Arc::new(PlaceholderForest::new())
            }
        },
        None => Arc::new(PlaceholderForest::new()),
    };

    let logger = StructuredLogger::new(&config.service_name);
    logger.log_startup(SERVER_VERSION, classifier.model_version());

    let state = Arc::new(AppState {
        classifier,
        metrics,
        health: health.clone(),
        stats,
        logger: logger.clone(),
        arity: config.arity_policy(),
    });

    // Mark server as ready after initialization
    health.set_ready(true).await;

    tokio::spawn(api::serve(config.bind_port, state));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
