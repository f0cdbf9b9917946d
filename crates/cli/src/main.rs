//! Titanic Survival Predictor CLI
//!
//! A command-line tool for exercising the prediction API: single
//! predictions, traffic generation, error injection, and metrics scraping.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{diagnostics, predict, traffic};

/// Titanic Survival Predictor CLI
#[derive(Parser)]
#[command(name = "tsp")]
#[command(author, version, about = "CLI for the Titanic Survival Predictor", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via TSP_API_URL env var)
    #[arg(long, env = "TSP_API_URL", default_value = "http://localhost:5001")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a single prediction request
    Predict {
        /// Feature values in column order
        /// (Pclass Sex Age SibSp Parch Fare Embarked_Q Embarked_S);
        /// a canonical sample is used when omitted
        #[arg(num_args = 0.., value_name = "FEATURE")]
        features: Vec<f32>,
    },

    /// Generate steady randomized traffic against /predict
    Traffic {
        /// How long to run, in seconds
        #[arg(long, default_value_t = 60)]
        duration: u64,

        /// Minimum pause between requests in milliseconds
        #[arg(long, default_value_t = 500)]
        min_pause_ms: u64,

        /// Maximum pause between requests in milliseconds
        #[arg(long, default_value_t = 2000)]
        max_pause_ms: u64,
    },

    /// Send requests back-to-back to drive up the CPU usage gauge
    Burst {
        /// How long to run, in seconds
        #[arg(long, default_value_t = 60)]
        duration: u64,
    },

    /// Post empty bodies to drive the invalid-request counter
    InjectErrors {
        /// How long to run, in seconds
        #[arg(long, default_value_t = 60)]
        duration: u64,

        /// Pause between requests in milliseconds
        #[arg(long, default_value_t = 100)]
        pause_ms: u64,
    },

    /// Scrape /metrics and display the tracked series
    Metrics {
        /// Only show series whose name contains this substring
        #[arg(long)]
        filter: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize client
    let client = client::ApiClient::new(&cli.api_url)?;

    // Execute command
    match cli.command {
        Commands::Predict { features } => {
            predict::send_prediction(&client, features, cli.format).await?;
        }
        Commands::Traffic {
            duration,
            min_pause_ms,
            max_pause_ms,
        } => {
            traffic::generate(&client, duration, min_pause_ms, max_pause_ms).await?;
        }
        Commands::Burst { duration } => {
            traffic::burst(&client, duration).await?;
        }
        Commands::InjectErrors { duration, pause_ms } => {
            traffic::inject_errors(&client, duration, pause_ms).await?;
        }
        Commands::Metrics { filter } => {
            diagnostics::show_metrics(&client, filter, cli.format).await?;
        }
    }

    Ok(())
}
