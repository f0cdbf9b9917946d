//! Single prediction command

use anyhow::Result;
use colored::Colorize;

use super::SAMPLE_FEATURES;
use crate::client::{ApiClient, PredictOutcome};
use crate::output::{print_error, print_success, OutputFormat};

/// Send one prediction request and display the result
pub async fn send_prediction(
    client: &ApiClient,
    features: Vec<f32>,
    format: OutputFormat,
) -> Result<()> {
    let features = if features.is_empty() {
        SAMPLE_FEATURES.to_vec()
    } else {
        features
    };

    match client.predict(&features).await? {
        PredictOutcome::Ok(response) => match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
            OutputFormat::Table => {
                let label = if response.prediction == 1 {
                    "survived".green().bold()
                } else {
                    "did not survive".red().bold()
                };
                print_success(&format!("Prediction: {} ({})", response.prediction, label));
            }
        },
        PredictOutcome::Rejected { code, error } => {
            print_error(&format!("Request rejected ({}): {}", code, error.error));
        }
    }

    Ok(())
}
