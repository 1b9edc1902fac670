//! trendradar - signal vs noise radar for emerging tools
//!
//! Stores radar runs of classified trends, refreshes them through an LLM
//! analysis endpoint and partitions each run into named buckets for display.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`] - Trend records, datasets and classifications
//! - [`partition`] - Bucket taxonomy and the single-pass partitioner
//! - [`loader`] - Dataset store, load notifications and the load gate
//! - [`storage`] - SQLite trend repository and sample data
//! - [`analysis`] - Chat-completion client producing new radar runs
//! - [`api`] - axum HTTP API
//! - [`config`] - Configuration management and settings
//! - [`metrics`] - Prometheus metrics
//! - [`utils`] - Retry and date helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use trendradar::loader::{BucketBoard, DatasetStore, LoadGate};
//! use trendradar::partition::Taxonomy;
//! use trendradar::storage::{seed_trends, SEED_DATE};
//! use trendradar::models::TrendDataset;
//!
//! let store = DatasetStore::new();
//! let board = BucketBoard::new();
//! let gate = LoadGate::new(Arc::new(Taxonomy::radar_default()), store.clone(), board.clone());
//! let ready = gate.on_ready(store.notifier());
//!
//! store.replace(TrendDataset::from_trends(SEED_DATE, seed_trends()));
//! # drop(ready);
//! ```

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod partition;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analysis::{LlmRadarAnalyzer, RadarAnalysis, RadarAnalyzer};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, RadarErrorTrait, Result};
    pub use crate::loader::{BucketBoard, DatasetStore, LoadGate};
    pub use crate::models::{Classification, FocusArea, Trend, TrendDataset, TrendRecord};
    pub use crate::partition::{partition, BucketResult, Taxonomy, TaxonomyEntry};
    pub use crate::storage::{SharedTrendRepository, TrendRepository};
}

// Direct re-exports for convenience
pub use models::{Classification, Trend, TrendDataset, TrendRecord};
pub use partition::{partition, Taxonomy};
