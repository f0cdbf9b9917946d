//! Metrics scraping command

use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{print_table, print_warning, OutputFormat};

/// One series from the exposition text
#[derive(Tabled, Serialize)]
pub struct MetricRow {
    #[tabled(rename = "Series")]
    pub name: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Parse Prometheus exposition text into series rows, skipping comments
fn parse_exposition(text: &str) -> Vec<MetricRow> {
    text.lines()
        .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let value = parts.next()?;
            Some(MetricRow {
                name: name.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

/// Scrape /metrics and display the series
pub async fn show_metrics(
    client: &ApiClient,
    filter: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let text = client.scrape_metrics().await?;

    let mut rows = parse_exposition(&text);
    if let Some(filter) = &filter {
        rows.retain(|row| row.name.contains(filter.as_str()));
    }

    if rows.is_empty() {
        print_warning("No series matched");
        return Ok(());
    }

    print_table(&rows, format);
    Ok(())
}
