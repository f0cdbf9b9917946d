//! HTTP API: prediction endpoint, Prometheus exposition, health probes

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serving_lib::{
    health::{ComponentStatus, HealthRegistry},
    models::{
        parse_request, ArityPolicy, ErrorResponse, PredictResponse, RequestError, RequestStatus,
        AGE_INDEX, FARE_INDEX,
    },
    Classifier, PredictionMetrics, ProcessStatsReader, StructuredLogger,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn Classifier>,
    pub metrics: PredictionMetrics,
    pub health: HealthRegistry,
    pub stats: Arc<ProcessStatsReader>,
    pub logger: StructuredLogger,
    pub arity: ArityPolicy,
}

/// How a prediction attempt went wrong, mapped to the HTTP error taxonomy:
/// rejections are 400 and counted as invalid, everything else is 500 and
/// leaves the invalid counter untouched.
enum PredictFailure {
    Rejected(RequestError),
    Internal(anyhow::Error),
}

impl From<RequestError> for PredictFailure {
    fn from(err: RequestError) -> Self {
        PredictFailure::Rejected(err)
    }
}

impl From<anyhow::Error> for PredictFailure {
    fn from(err: anyhow::Error) -> Self {
        PredictFailure::Internal(err)
    }
}

/// POST /predict - validate, normalize, classify, instrument
async fn predict(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let started = Instant::now();

    refresh_system_gauges(&state).await;
    state.metrics.inc_requests();

    match run_prediction(&state, &body) {
        Ok(prediction) => {
            let latency = started.elapsed().as_secs_f64();
            state.metrics.observe_latency(latency);
            state
                .logger
                .log_prediction(prediction, latency, state.classifier.model_version());
            (
                StatusCode::OK,
                Json(PredictResponse {
                    prediction,
                    status: RequestStatus::Success,
                }),
            )
                .into_response()
        }
        Err(PredictFailure::Rejected(err)) => {
            state.metrics.inc_invalid_requests();
            state.logger.log_rejected_request(&err.to_string());
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: err.to_string(),
                    status: RequestStatus::ValidationError,
                }),
            )
                .into_response()
        }
        Err(PredictFailure::Internal(err)) => {
            state.logger.log_prediction_failure(&format!("{err:#}"));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: err.to_string(),
                    status: RequestStatus::Failed,
                }),
            )
                .into_response()
        }
    }
}

/// The linear per-request pipeline behind /predict
fn run_prediction(state: &AppState, body: &[u8]) -> Result<u8, PredictFailure> {
    let request = parse_request(body)?;
    let features = state.arity.normalize(request.features)?;

    if features.len() > AGE_INDEX {
        state.metrics.observe_age(f64::from(features[AGE_INDEX]));
    }
    if features.len() > FARE_INDEX {
        state.metrics.observe_fare(f64::from(features[FARE_INDEX]));
    }
    let sum: f32 = features.iter().sum();
    state.metrics.add_feature_sum(f64::from(sum))?;

    let prediction = state.classifier.predict(&features)?;
    state.metrics.set_last_prediction(prediction);
    state.metrics.inc_output_class(prediction);

    Ok(prediction)
}

/// Refresh the CPU/memory gauges before handling the request.
/// A failed sample never fails the prediction.
async fn refresh_system_gauges(state: &AppState) {
    match state.stats.sample().await {
        Ok(stats) => state
            .metrics
            .set_system_usage(stats.cpu_percent, stats.rss_bytes),
        Err(err) => debug!(error = %err, "Skipping system gauge refresh"),
    }
}

/// Prometheus metrics endpoint
async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        state.metrics.encode(),
    )
}

/// Health check response - 200 unless a component is unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let report = state.health.report().await;

    let status_code = match report.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(report))
}

/// Readiness check response - 200 once initialized and operational
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/metrics", get(metrics))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
