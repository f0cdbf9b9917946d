//! Survival classification engine

mod onnx;
mod placeholder;

pub use onnx::OnnxClassifier;
pub use placeholder::PlaceholderForest;

use anyhow::Result;

/// Trait for survival classifier implementations
pub trait Classifier: Send + Sync {
    /// Produce a survival label (0 = did not survive, 1 = survived).
    ///
    /// Callers must normalize the vector to [`crate::models::FEATURE_WIDTH`]
    /// before calling; shape handling is the endpoint's responsibility.
    fn predict(&self, features: &[f32]) -> Result<u8>;

    /// Version tag of the decision function currently in use
    fn model_version(&self) -> &str;
}
