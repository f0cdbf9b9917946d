//! Traffic generation and error injection
//!
//! Drives the prediction endpoint so the dashboards have something to show:
//! steady randomized traffic, an unthrottled burst for the CPU gauge, and
//! empty-body posts for the invalid-request counter.

use anyhow::Result;
use rand::Rng;
use reqwest::StatusCode;
use std::time::{Duration, Instant};

use super::SAMPLE_FEATURES;
use crate::client::{ApiClient, PredictOutcome};
use crate::output::{print_info, print_success, print_warning};

/// Width of the randomized payloads
const FEATURE_WIDTH: usize = 8;

/// Steady randomized traffic with a randomized pause between requests
pub async fn generate(
    client: &ApiClient,
    duration_secs: u64,
    min_pause_ms: u64,
    max_pause_ms: u64,
) -> Result<()> {
    print_info(&format!(
        "Generating traffic for {}s (ctrl-c to stop early)",
        duration_secs
    ));

    let deadline = Instant::now() + Duration::from_secs(duration_secs);
    let max_pause_ms = max_pause_ms.max(min_pause_ms);
    let mut sent = 0u64;
    let mut failed = 0u64;

    while Instant::now() < deadline {
        // ThreadRng is not Send, so it must not live across an await
        let (features, pause_ms) = {
            let mut rng = rand::thread_rng();
            let features: Vec<f32> = (0..FEATURE_WIDTH).map(|_| rng.gen::<f32>()).collect();
            (features, rng.gen_range(min_pause_ms..=max_pause_ms))
        };

        match client.predict(&features).await {
            Ok(PredictOutcome::Ok(response)) => {
                sent += 1;
                print_info(&format!(
                    "prediction={} status={}",
                    response.prediction, response.status
                ));
            }
            Ok(PredictOutcome::Rejected { code, error }) => {
                failed += 1;
                print_warning(&format!("Rejected ({}): {}", code, error.error));
            }
            Err(err) => {
                failed += 1;
                print_warning(&format!("Request failed: {}", err));
            }
        }

        tokio::time::sleep(Duration::from_millis(pause_ms)).await;
    }

    print_success(&format!("Done: {} requests sent, {} failed", sent, failed));
    Ok(())
}

/// Unthrottled request loop; the sustained load shows up in the
/// system_cpu_usage_percent gauge
pub async fn burst(client: &ApiClient, duration_secs: u64) -> Result<()> {
    print_info(&format!("Bursting requests for {}s", duration_secs));

    let deadline = Instant::now() + Duration::from_secs(duration_secs);
    let mut count = 0u64;

    while Instant::now() < deadline {
        match client.predict(&SAMPLE_FEATURES).await {
            Ok(_) => {
                count += 1;
                if count % 100 == 0 {
                    print_info(&format!("{} requests sent", count));
                }
            }
            Err(err) => {
                print_warning(&format!("Request failed: {}", err));
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }

    print_success(&format!("Done: {} requests sent", count));
    Ok(())
}

/// Empty-body posts that the server must reject with 400, each one bumping
/// invalid_requests_total
pub async fn inject_errors(client: &ApiClient, duration_secs: u64, pause_ms: u64) -> Result<()> {
    print_info(&format!("Injecting invalid requests for {}s", duration_secs));

    let deadline = Instant::now() + Duration::from_secs(duration_secs);
    let mut count = 0u64;

    while Instant::now() < deadline {
        match client.predict_raw(&serde_json::json!({})).await {
            Ok(PredictOutcome::Rejected { code, .. }) if code == StatusCode::BAD_REQUEST => {
                count += 1;
                if count % 20 == 0 {
                    print_info(&format!("{} invalid requests sent", count));
                }
            }
            Ok(_) => print_warning("Expected a 400 rejection"),
            Err(err) => {
                print_warning(&format!("Request failed: {}", err));
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }

        tokio::time::sleep(Duration::from_millis(pause_ms)).await;
    }

    print_success(&format!("Done: {} invalid requests sent", count));
    Ok(())
}
