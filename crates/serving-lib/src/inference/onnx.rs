//! ONNX artifact inference using tract
//!
//! Loads a classifier exported from the training pipeline and runs
//! single-row inference over the 8 Titanic features.

use super::Classifier;
use crate::models::FEATURE_WIDTH;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Maximum inference latency before warning (5ms target)
const MAX_INFERENCE_MS: u128 = 5;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Classifier backed by a persisted ONNX artifact
pub struct OnnxClassifier {
    model: TractModel,
    model_version: String,
}

impl OnnxClassifier {
    /// Load and optimize a classifier from ONNX bytes
    pub fn from_bytes(model_bytes: &[u8], version: impl Into<String>) -> Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, FEATURE_WIDTH]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;

        Ok(Self {
            model,
            model_version: version.into(),
        })
    }

    /// Load a classifier from an ONNX artifact on disk.
    /// The file stem doubles as the model version tag.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read model artifact {}", path.display()))?;
        let version = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx")
            .to_string();
        Self::from_bytes(&bytes, version)
    }

    /// Convert a normalized feature vector to a single-row tensor
    fn features_to_tensor(features: &[f32]) -> Tensor {
        tract_ndarray::Array2::from_shape_vec((1, FEATURE_WIDTH), features.to_vec())
            .expect("feature vector normalized to model width by caller")
            .into()
    }

    /// Collapse the model output to a binary label.
    ///
    /// Single-value outputs (a survival probability) are thresholded at 0.5;
    /// wider outputs (per-class scores) use argmax.
    fn output_to_label(output: &Tensor) -> Result<u8> {
        let view = output.to_array_view::<f32>()?;
        let values: Vec<f32> = view.iter().copied().collect();

        match values.as_slice() {
            [] => anyhow::bail!("Model produced no output values"),
            [score] => Ok(u8::from(*score >= 0.5)),
            scores => {
                let (label, _) = scores
                    .iter()
                    .enumerate()
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .expect("non-empty slice checked above");
                Ok(label.min(1) as u8)
            }
        }
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &[f32]) -> Result<u8> {
        let start = Instant::now();

        let input = Self::features_to_tensor(features);
        let result = self.model.run(tvec!(input.into()))?;
        let output = result.get(0).context("No output from model")?;
        let label = Self::output_to_label(output)?;

        let elapsed = start.elapsed();
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                "Inference exceeded {}ms target", MAX_INFERENCE_MS
            );
        } else {
            debug!(elapsed_us = elapsed.as_micros() as u64, "Inference completed");
        }

        Ok(label)
    }

    fn model_version(&self) -> &str {
        &self.model_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tensor_from(values: &[f32]) -> Tensor {
        tract_ndarray::Array2::from_shape_vec((1, values.len()), values.to_vec())
            .unwrap()
            .into()
    }

    #[test]
    fn test_single_output_thresholded() {
        assert_eq!(OnnxClassifier::output_to_label(&tensor_from(&[0.2])).unwrap(), 0);
        assert_eq!(OnnxClassifier::output_to_label(&tensor_from(&[0.5])).unwrap(), 1);
        assert_eq!(OnnxClassifier::output_to_label(&tensor_from(&[0.9])).unwrap(), 1);
    }

    #[test]
    fn test_two_class_argmax() {
        assert_eq!(
            OnnxClassifier::output_to_label(&tensor_from(&[0.7, 0.3])).unwrap(),
            0
        );
        assert_eq!(
            OnnxClassifier::output_to_label(&tensor_from(&[0.1, 0.9])).unwrap(),
            1
        );
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(OnnxClassifier::from_bytes(b"not an onnx model", "v0").is_err());
    }
}
