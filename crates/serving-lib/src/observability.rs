//! Observability infrastructure for the prediction service
//!
//! Provides:
//! - Prometheus metrics for the /predict request path
//! - Structured JSON logging with tracing

use anyhow::Result;
use prometheus::{
    Counter, Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};
use tracing::{info, warn};

/// Histogram buckets for request latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Histogram buckets for passenger age (in years)
const AGE_BUCKETS: &[f64] = &[5.0, 12.0, 18.0, 25.0, 35.0, 45.0, 55.0, 65.0, 80.0];

/// Histogram buckets for ticket fare
const FARE_BUCKETS: &[f64] = &[5.0, 10.0, 20.0, 40.0, 80.0, 160.0, 320.0, 512.0];

/// Metrics sink for the prediction endpoint
///
/// Owns a private registry rather than using the process-wide default, so it
/// is injected into the endpoint state and shared by cloning; clones see the
/// same underlying series. All mutations are atomic inside the prometheus
/// primitives, so handles can be used from any request handler without
/// additional locking.
#[derive(Clone)]
pub struct PredictionMetrics {
    registry: Registry,
    requests_total: IntCounter,
    latency_seconds: Histogram,
    last_prediction: IntGauge,
    output_count: IntCounterVec,
    feature_sum: Counter,
    invalid_requests: IntCounter,
    cpu_usage_percent: Gauge,
    memory_usage_bytes: IntGauge,
    age_distribution: Histogram,
    fare_distribution: Histogram,
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let requests_total = IntCounter::new(
            "prediction_requests_total",
            "Total number of prediction requests",
        )
        .expect("Failed to create prediction_requests_total");

        let latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "prediction_latency_seconds",
                "Time spent processing a prediction",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
        )
        .expect("Failed to create prediction_latency_seconds");

        let last_prediction = IntGauge::new(
            "last_prediction_value",
            "The value of the last prediction",
        )
        .expect("Failed to create last_prediction_value");

        let output_count = IntCounterVec::new(
            Opts::new(
                "prediction_output_count",
                "Distribution of prediction classes",
            ),
            &["class"],
        )
        .expect("Failed to create prediction_output_count");

        let feature_sum = Counter::new(
            "input_feature_sum",
            "Running sum of all input feature values",
        )
        .expect("Failed to create input_feature_sum");

        let invalid_requests = IntCounter::new(
            "invalid_requests_total",
            "Total number of malformed or empty prediction requests",
        )
        .expect("Failed to create invalid_requests_total");

        let cpu_usage_percent = Gauge::new(
            "system_cpu_usage_percent",
            "Process CPU utilization at the last request",
        )
        .expect("Failed to create system_cpu_usage_percent");

        let memory_usage_bytes = IntGauge::new(
            "system_memory_usage_bytes",
            "Process resident memory at the last request",
        )
        .expect("Failed to create system_memory_usage_bytes");

        let age_distribution = Histogram::with_opts(
            HistogramOpts::new(
                "feature_age_distribution",
                "Distribution of the normalized age feature",
            )
            .buckets(AGE_BUCKETS.to_vec()),
        )
        .expect("Failed to create feature_age_distribution");

        let fare_distribution = Histogram::with_opts(
            HistogramOpts::new(
                "feature_fare_distribution",
                "Distribution of the normalized fare feature",
            )
            .buckets(FARE_BUCKETS.to_vec()),
        )
        .expect("Failed to create feature_fare_distribution");

        let metrics = Self {
            registry,
            requests_total,
            latency_seconds,
            last_prediction,
            output_count,
            feature_sum,
            invalid_requests,
            cpu_usage_percent,
            memory_usage_bytes,
            age_distribution,
            fare_distribution,
        };
        metrics.register_all();
        metrics
    }

    fn register_all(&self) {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(self.requests_total.clone()),
            Box::new(self.latency_seconds.clone()),
            Box::new(self.last_prediction.clone()),
            Box::new(self.output_count.clone()),
            Box::new(self.feature_sum.clone()),
            Box::new(self.invalid_requests.clone()),
            Box::new(self.cpu_usage_percent.clone()),
            Box::new(self.memory_usage_bytes.clone()),
            Box::new(self.age_distribution.clone()),
            Box::new(self.fare_distribution.clone()),
        ];
        for collector in collectors {
            self.registry
                .register(collector)
                .expect("Failed to register metric");
        }
    }

    /// Count a /predict call, whatever its outcome
    pub fn inc_requests(&self) {
        self.requests_total.inc();
    }

    /// Record wall time of a completed prediction
    pub fn observe_latency(&self, duration_secs: f64) {
        self.latency_seconds.observe(duration_secs);
    }

    /// Record the most recent label emitted
    pub fn set_last_prediction(&self, label: u8) {
        self.last_prediction.set(i64::from(label));
    }

    /// Count a prediction under its class label
    pub fn inc_output_class(&self, label: u8) {
        self.output_count
            .with_label_values(&[&label.to_string()])
            .inc();
    }

    /// Add the feature-vector sum to the drift counter.
    /// Counters are monotonic, so a negative sum is an error.
    pub fn add_feature_sum(&self, sum: f64) -> Result<()> {
        if sum < 0.0 {
            anyhow::bail!("counter increment must be non-negative, got {sum}");
        }
        self.feature_sum.inc_by(sum);
        Ok(())
    }

    /// Count a malformed or empty request
    pub fn inc_invalid_requests(&self) {
        self.invalid_requests.inc();
    }

    /// Refresh the host-level gauges
    pub fn set_system_usage(&self, cpu_percent: f64, rss_bytes: u64) {
        self.cpu_usage_percent.set(cpu_percent);
        self.memory_usage_bytes.set(rss_bytes as i64);
    }

    /// Observe the normalized age feature
    pub fn observe_age(&self, value: f64) {
        self.age_distribution.observe(value);
    }

    /// Observe the normalized fare feature
    pub fn observe_fare(&self, value: f64) {
        self.fare_distribution.observe(value);
    }

    /// Encode all series in the Prometheus text exposition format
    pub fn encode(&self) -> Vec<u8> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .expect("Failed to encode metrics");
        buffer
    }
}

/// Structured logger for service events
///
/// Emits consistent JSON-formatted events for predictions, rejections,
/// failures, and lifecycle transitions.
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, model_version: &str) {
        info!(
            event = "server_started",
            service = %self.service,
            server_version = %version,
            model_version = %model_version,
            "Prediction server started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "server_shutdown",
            service = %self.service,
            reason = %reason,
            "Prediction server shutting down"
        );
    }

    /// Log a served prediction
    pub fn log_prediction(&self, prediction: u8, latency_secs: f64, model_version: &str) {
        info!(
            event = "prediction_served",
            service = %self.service,
            prediction = prediction,
            latency_secs = latency_secs,
            model_version = %model_version,
            "Prediction served"
        );
    }

    /// Log a rejected request
    pub fn log_rejected_request(&self, detail: &str) {
        warn!(
            event = "request_rejected",
            service = %self.service,
            detail = %detail,
            "Rejected prediction request"
        );
    }

    /// Log a prediction that failed after validation
    pub fn log_prediction_failure(&self, error: &str) {
        warn!(
            event = "prediction_failed",
            service = %self.service,
            error = %error,
            "Prediction failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exposition(metrics: &PredictionMetrics) -> String {
        String::from_utf8(metrics.encode()).unwrap()
    }

    #[test]
    fn test_all_series_registered() {
        let metrics = PredictionMetrics::new();
        metrics.inc_output_class(1);

        let text = exposition(&metrics);
        for name in [
            "prediction_requests_total",
            "prediction_latency_seconds",
            "last_prediction_value",
            "prediction_output_count",
            "input_feature_sum",
            "invalid_requests_total",
            "system_cpu_usage_percent",
            "system_memory_usage_bytes",
            "feature_age_distribution",
            "feature_fare_distribution",
        ] {
            assert!(text.contains(name), "missing series {name}");
        }
    }

    #[test]
    fn test_request_counters() {
        let metrics = PredictionMetrics::new();
        metrics.inc_requests();
        metrics.inc_requests();
        metrics.inc_invalid_requests();

        let text = exposition(&metrics);
        assert!(text.contains("prediction_requests_total 2"));
        assert!(text.contains("invalid_requests_total 1"));
    }

    #[test]
    fn test_prediction_metrics() {
        let metrics = PredictionMetrics::new();
        metrics.set_last_prediction(1);
        metrics.inc_output_class(1);
        metrics.inc_output_class(1);
        metrics.inc_output_class(0);

        let text = exposition(&metrics);
        assert!(text.contains("last_prediction_value 1"));
        assert!(text.contains(r#"prediction_output_count{class="1"} 2"#));
        assert!(text.contains(r#"prediction_output_count{class="0"} 1"#));
    }

    #[test]
    fn test_feature_sum_rejects_negative() {
        let metrics = PredictionMetrics::new();
        metrics.add_feature_sum(34.25).unwrap();
        assert!(metrics.add_feature_sum(-1.0).is_err());

        let text = exposition(&metrics);
        assert!(text.contains("input_feature_sum 34.25"));
    }

    #[test]
    fn test_age_histogram_count_and_sum() {
        let metrics = PredictionMetrics::new();
        metrics.observe_age(22.0);
        metrics.observe_age(40.0);

        let text = exposition(&metrics);
        assert!(text.contains("feature_age_distribution_count 2"));
        assert!(text.contains("feature_age_distribution_sum 62"));
    }

    #[test]
    fn test_system_gauges() {
        let metrics = PredictionMetrics::new();
        metrics.set_system_usage(12.5, 64 * 1024 * 1024);

        let text = exposition(&metrics);
        assert!(text.contains("system_cpu_usage_percent 12.5"));
        assert!(text.contains("system_memory_usage_bytes 67108864"));
    }

    #[test]
    fn test_instances_are_isolated() {
        let a = PredictionMetrics::new();
        let b = PredictionMetrics::new();
        a.inc_requests();

        assert!(exposition(&a).contains("prediction_requests_total 1"));
        assert!(exposition(&b).contains("prediction_requests_total 0"));
    }

    #[test]
    fn test_clones_share_series() {
        let metrics = PredictionMetrics::new();
        let handle = metrics.clone();
        handle.inc_requests();

        assert!(exposition(&metrics).contains("prediction_requests_total 1"));
    }
}
