//! Serving library for the Titanic survival predictor
//!
//! This crate provides the core functionality for:
//! - Binary survival inference (ONNX artifact or synthetic placeholder)
//! - Request validation and feature-vector normalization
//! - Prometheus metrics and structured logging
//! - Process CPU/memory sampling for the system gauges
//! - Health checks for liveness/readiness probes

pub mod health;
pub mod inference;
pub mod models;
pub mod observability;
pub mod system;

pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthReport, ReadinessReport,
};
pub use inference::{Classifier, OnnxClassifier, PlaceholderForest};
pub use models::*;
pub use observability::{PredictionMetrics, StructuredLogger};
pub use system::{ProcessStats, ProcessStatsReader};
