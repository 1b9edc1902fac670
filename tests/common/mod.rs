//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use trendradar::models::{TrendDataset, TrendRecord};
use trendradar::storage::{create_mock_repository, seed, seed_trends, SharedTrendRepository, SEED_DATE};

/// Record with bucketing keys and a tool name
pub fn record(focus_area: &str, classification: &str, tool_name: &str) -> TrendRecord {
    TrendRecord::keyed(focus_area, classification).with_payload("tool_name", tool_name)
}

/// Dataset holding the sample radar
pub fn sample_dataset() -> TrendDataset {
    TrendDataset::from_trends(SEED_DATE, seed_trends())
}

/// Dataset as the view sees it before a load completes
pub fn unloaded_dataset() -> TrendDataset {
    TrendDataset {
        radar_date: None,
        trends: None,
    }
}

/// In-memory repository holding the sample radar
pub fn seeded_repo() -> SharedTrendRepository {
    let repo = create_mock_repository();
    seed(repo.as_ref()).expect("seed mock repository");
    repo
}

/// Tool names of a bucket, in order
pub fn tool_names(items: &[TrendRecord]) -> Vec<String> {
    items
        .iter()
        .map(|r| r.tool_name().unwrap_or_default().to_string())
        .collect()
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
