//! Health tracking for liveness and readiness probes

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a service component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is impaired but the service can still answer
    Degraded,
    /// Component has failed
    Unhealthy,
}

/// Health of a single component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_update_timestamp: i64,
}

impl ComponentHealth {
    fn with_status(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            last_update_timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Overall health response served at /healthz
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

/// Readiness response served at /readyz
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names tracked by the service
pub mod components {
    pub const INFERENCE: &str = "inference";
    pub const SYSTEM_STATS: &str = "system_stats";
}

/// Registry of component health plus the service readiness flag
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
    ready: Arc<RwLock<bool>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component with initial healthy status
    pub async fn register(&self, name: &str) {
        self.update(name, ComponentStatus::Healthy, None).await;
    }

    pub async fn set_healthy(&self, name: &str) {
        self.update(name, ComponentStatus::Healthy, None).await;
    }

    pub async fn set_degraded(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentStatus::Degraded, Some(message.into()))
            .await;
    }

    pub async fn set_unhealthy(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentStatus::Unhealthy, Some(message.into()))
            .await;
    }

    async fn update(&self, name: &str, status: ComponentStatus, message: Option<String>) {
        let mut components = self.components.write().await;
        components.insert(
            name.to_string(),
            ComponentHealth::with_status(status, message),
        );
    }

    /// Flip readiness once initialization finishes
    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    /// Overall health: unhealthy dominates, then degraded
    pub async fn report(&self) -> HealthReport {
        let components = self.components.read().await.clone();
        let mut status = ComponentStatus::Healthy;
        for health in components.values() {
            match health.status {
                ComponentStatus::Unhealthy => {
                    status = ComponentStatus::Unhealthy;
                    break;
                }
                ComponentStatus::Degraded => status = ComponentStatus::Degraded,
                ComponentStatus::Healthy => {}
            }
        }
        HealthReport { status, components }
    }

    /// Ready only after initialization and while no component is unhealthy
    pub async fn readiness(&self) -> ReadinessReport {
        if !*self.ready.read().await {
            return ReadinessReport {
                ready: false,
                reason: Some("Server not yet initialized".to_string()),
            };
        }
        let report = self.report().await;
        if report.status == ComponentStatus::Unhealthy {
            return ReadinessReport {
                ready: false,
                reason: Some("Critical component unhealthy".to_string()),
            };
        }
        ReadinessReport {
            ready: true,
            reason: None,
        }
    }
}
