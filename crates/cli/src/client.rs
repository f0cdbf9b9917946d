//! HTTP client for the prediction API

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

/// Client for the survival prediction server
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

/// Request body for /predict
#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest {
    pub features: Vec<f32>,
}

/// Successful /predict response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: u8,
    pub status: String,
}

/// Error body returned on 400/500 responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Outcome of a /predict call; rejections carry the server's error body
#[derive(Debug)]
pub enum PredictOutcome {
    Ok(PredictResponse),
    Rejected { code: StatusCode, error: ApiError },
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// POST a feature vector to /predict
    pub async fn predict(&self, features: &[f32]) -> Result<PredictOutcome> {
        self.post_predict(&PredictRequest {
            features: features.to_vec(),
        })
        .await
    }

    /// POST an arbitrary JSON body to /predict (for error injection)
    pub async fn predict_raw(&self, body: &serde_json::Value) -> Result<PredictOutcome> {
        self.post_predict(body).await
    }

    async fn post_predict<B: Serialize>(&self, body: &B) -> Result<PredictOutcome> {
        let url = self.base_url.join("predict").context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        let code = response.status();
        if code.is_success() {
            let parsed = response
                .json()
                .await
                .context("Failed to parse prediction response")?;
            Ok(PredictOutcome::Ok(parsed))
        } else {
            let error = response.json().await.unwrap_or_else(|_| ApiError {
                error: format!("HTTP {}", code),
                status: None,
            });
            Ok(PredictOutcome::Rejected { code, error })
        }
    }

    /// GET /metrics as raw exposition text
    pub async fn scrape_metrics(&self) -> Result<String> {
        let url = self.base_url.join("metrics").context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            anyhow::bail!("Metrics scrape failed with HTTP {}", response.status());
        }

        response.text().await.context("Failed to read metrics body")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_predict_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/predict")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"prediction": 1, "status": "success"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let outcome = client
            .predict(&[3.0, 0.0, 22.0, 1.0, 0.0, 7.25, 1.0, 0.0])
            .await
            .unwrap();

        match outcome {
            PredictOutcome::Ok(response) => {
                assert_eq!(response.prediction, 1);
                assert_eq!(response.status, "success");
            }
            other => panic!("expected success, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_predict_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/predict")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "request body is empty", "status": "validation_error"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let outcome = client.predict_raw(&serde_json::json!({})).await.unwrap();

        match outcome {
            PredictOutcome::Rejected { code, error } => {
                assert_eq!(code, StatusCode::BAD_REQUEST);
                assert_eq!(error.error, "request body is empty");
                assert_eq!(error.status.as_deref(), Some("validation_error"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_scrape_metrics() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/metrics")
            .with_status(200)
            .with_body("prediction_requests_total 5\n")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let text = client.scrape_metrics().await.unwrap();
        assert!(text.contains("prediction_requests_total 5"));
    }
}
