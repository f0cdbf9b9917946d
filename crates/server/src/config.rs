//! Server configuration

use anyhow::Result;
use serde::Deserialize;
use serving_lib::models::ArityPolicy;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Port the prediction API listens on
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Path to a trained ONNX artifact; the synthetic placeholder model is
    /// used when unset
    #[serde(default)]
    pub model_path: Option<String>,

    /// Reject feature vectors that are not exactly eight wide instead of
    /// padding/truncating them
    #[serde(default)]
    pub strict_features: bool,

    /// Service name attached to structured log events
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_bind_port() -> u16 {
    5001
}

fn default_service_name() -> String {
    "survival-predictor".to_string()
}

impl ServerConfig {
    /// Load configuration from PREDICTOR_* environment variables
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("PREDICTOR"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| ServerConfig {
            bind_port: default_bind_port(),
            model_path: None,
            strict_features: false,
            service_name: default_service_name(),
        }))
    }

    pub fn arity_policy(&self) -> ArityPolicy {
        if self.strict_features {
            ArityPolicy::Strict
        } else {
            ArityPolicy::PadTruncate
        }
    }
}
