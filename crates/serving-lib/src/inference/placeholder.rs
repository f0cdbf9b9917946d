//! Placeholder decision function fitted on synthetic data
//!
//! Used when no trained artifact is configured: fits a small ensemble of
//! decision stumps on seeded random data of the model's input shape, purely
//! to obtain a callable decision function so the service can answer from the
//! moment it is constructed. Predictions are structurally valid but carry no
//! signal; a real deployment points `model_path` at a trained artifact
//! instead.

use super::Classifier;
use crate::models::FEATURE_WIDTH;
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of stumps in the ensemble
const NUM_TREES: usize = 10;

/// Number of synthetic rows used for fitting
const NUM_SAMPLES: usize = 10;

/// Fixed seed so every process fits the identical placeholder
const SEED: u64 = 42;

/// A depth-one decision tree over a single feature column
#[derive(Debug, Clone, Copy)]
struct Stump {
    feature: usize,
    threshold: f32,
    below: u8,
    above: u8,
}

impl Stump {
    fn classify(&self, features: &[f32]) -> u8 {
        if features[self.feature] < self.threshold {
            self.below
        } else {
            self.above
        }
    }
}

/// Majority-vote ensemble of random stumps
pub struct PlaceholderForest {
    trees: Vec<Stump>,
}

impl PlaceholderForest {
    pub fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(SEED);

        let rows: Vec<[f32; FEATURE_WIDTH]> = (0..NUM_SAMPLES)
            .map(|_| std::array::from_fn(|_| rng.gen::<f32>()))
            .collect();
        let labels: Vec<u8> = (0..NUM_SAMPLES).map(|_| rng.gen_range(0..2)).collect();

        let trees = (0..NUM_TREES)
            .map(|_| Self::fit_stump(&mut rng, &rows, &labels))
            .collect();

        Self { trees }
    }

    /// Pick a random split and take the majority label on each side
    fn fit_stump(rng: &mut StdRng, rows: &[[f32; FEATURE_WIDTH]], labels: &[u8]) -> Stump {
        let feature = rng.gen_range(0..FEATURE_WIDTH);
        let threshold = rng.gen::<f32>();
        Stump {
            feature,
            threshold,
            below: majority_label(rows, labels, |row| row[feature] < threshold),
            above: majority_label(rows, labels, |row| row[feature] >= threshold),
        }
    }
}

impl Default for PlaceholderForest {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for PlaceholderForest {
    fn predict(&self, features: &[f32]) -> Result<u8> {
        let votes: usize = self
            .trees
            .iter()
            .map(|tree| tree.classify(features) as usize)
            .sum();
        Ok(u8::from(votes * 2 > self.trees.len()))
    }

    fn model_version(&self) -> &str {
        "placeholder"
    }
}

fn majority_label<F>(rows: &[[f32; FEATURE_WIDTH]], labels: &[u8], side: F) -> u8
where
    F: Fn(&[f32; FEATURE_WIDTH]) -> bool,
{
    let mut ones = 0usize;
    let mut total = 0usize;
    for (row, &label) in rows.iter().zip(labels) {
        if side(row) {
            total += 1;
            if label == 1 {
                ones += 1;
            }
        }
    }
    if total == 0 {
        0
    } else {
        u8::from(ones * 2 > total)
    }
}
