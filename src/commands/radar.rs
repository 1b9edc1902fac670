use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use trendradar::config::Config;
use trendradar::loader::{
    dataset_from_repository, fetch_dataset, load_dataset_from_file, BucketBoard, DatasetStore,
    GateOutcome, LoadGate,
};
use trendradar::models::TrendDataset;
use trendradar::storage::open_repository;
use trendradar::utils::is_valid_radar_date;

/// Options of the `radar` command
#[derive(Debug, Clone, Default)]
pub struct RadarParams {
    /// Radar date; the latest stored date when absent
    pub date: Option<String>,

    /// Read the dataset from a JSON file instead of the store
    pub file: Option<PathBuf>,

    /// Read the dataset from a running radar server
    pub url: Option<String>,
}

/// Load a dataset, run it through the load gate and print every bucket
pub async fn radar(config: Config, params: RadarParams) -> Result<()> {
    validate_date(params.date.as_deref())?;

    let taxonomy = Arc::new(config.taxonomy().context("Invalid taxonomy configuration")?);
    let store = DatasetStore::new();
    let board = BucketBoard::new();

    let mut ready =
        LoadGate::new(taxonomy.clone(), store.clone(), board.clone()).on_ready(store.notifier());

    let dataset = load(&config, &params).await?;
    store.replace(dataset);

    match ready.next_load().await {
        Some(GateOutcome::Published { buckets, matched }) => {
            tracing::info!(buckets, matched, "Radar partitioned");
        }
        Some(outcome) => {
            println!("No trends loaded ({})", outcome.as_str());
            return Ok(());
        }
        None => anyhow::bail!("Load notifier closed before the dataset was published"),
    }

    if let Some(date) = store.current().and_then(|d| d.radar_date.clone()) {
        println!("Radar {date}");
    }

    for entry in taxonomy.entries() {
        let items = board.items(&entry.output_key).unwrap_or_default();
        println!("\n{} ({})", entry.output_key, items.len());
        for item in items {
            println!(
                "  - {:<24} {:>3}  {}",
                item.tool_name().unwrap_or("?"),
                item.confidence_score().map(|s| s.to_string()).unwrap_or_default(),
                match item.architectural_verdict() {
                    Some(true) => "adopt",
                    Some(false) => "skip",
                    None => "",
                }
            );
        }
    }

    Ok(())
}

fn validate_date(date: Option<&str>) -> Result<()> {
    match date {
        Some(date) if !is_valid_radar_date(date) => {
            anyhow::bail!("Invalid date '{date}', expected YYYY-MM-DD")
        }
        _ => Ok(()),
    }
}

async fn load(config: &Config, params: &RadarParams) -> Result<TrendDataset> {
    if let Some(file) = &params.file {
        return load_dataset_from_file(file)
            .with_context(|| format!("Failed to load {}", file.display()));
    }

    if let Some(base) = &params.url {
        let mut url = format!("{}/api/radar", base.trim_end_matches('/'));
        if let Some(date) = &params.date {
            url.push_str(&format!("?date={date}"));
        }
        let client = reqwest::Client::new();
        return fetch_dataset(&client, &url)
            .await
            .with_context(|| format!("Failed to fetch {url}"));
    }

    let repo = open_repository(&config.database)
        .with_context(|| format!("Failed to open {}", config.database.path.display()))?;
    dataset_from_repository(repo.as_ref(), params.date.as_deref())
}
