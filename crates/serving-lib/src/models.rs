//! Wire types and input validation for the prediction endpoint

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of features the classifier is trained on
pub const FEATURE_WIDTH: usize = 8;

/// Positional meaning of the feature vector columns
pub const FEATURE_NAMES: [&str; FEATURE_WIDTH] = [
    "Pclass",
    "Sex",
    "Age",
    "SibSp",
    "Parch",
    "Fare",
    "Embarked_Q",
    "Embarked_S",
];

/// Index of the passenger age column
pub const AGE_INDEX: usize = 2;

/// Index of the ticket fare column
pub const FARE_INDEX: usize = 5;

/// Body of a `POST /predict` request
#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub features: Vec<f32>,
}

/// Outcome tag carried in every response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Success,
    ValidationError,
    Failed,
}

/// Successful prediction response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// 0 = did not survive, 1 = survived
    pub prediction: u8,
    pub status: RequestStatus,
}

/// Error response for rejected or failed requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: RequestStatus,
}

/// Reasons a request is rejected before reaching the classifier
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request body is empty")]
    EmptyBody,

    #[error("invalid request payload: {0}")]
    Schema(String),

    #[error("expected {expected} features, got {actual}")]
    Arity { expected: usize, actual: usize },
}

/// How the endpoint treats vectors that are not exactly [`FEATURE_WIDTH`] wide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArityPolicy {
    /// Right-pad short vectors with zeros and truncate long ones
    #[default]
    PadTruncate,
    /// Reject anything that is not exactly [`FEATURE_WIDTH`] wide
    Strict,
}

impl ArityPolicy {
    /// Bring a feature vector to the model's trained width
    pub fn normalize(&self, mut features: Vec<f32>) -> Result<Vec<f32>, RequestError> {
        match self {
            ArityPolicy::PadTruncate => {
                features.resize(FEATURE_WIDTH, 0.0);
                Ok(features)
            }
            ArityPolicy::Strict => {
                if features.len() != FEATURE_WIDTH {
                    return Err(RequestError::Arity {
                        expected: FEATURE_WIDTH,
                        actual: features.len(),
                    });
                }
                Ok(features)
            }
        }
    }
}

/// Parse a raw request body into a prediction request
pub fn parse_request(body: &[u8]) -> Result<PredictRequest, RequestError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(RequestError::EmptyBody);
    }
    serde_json::from_slice(body).map_err(|e| RequestError::Schema(e.to_string()))
}
