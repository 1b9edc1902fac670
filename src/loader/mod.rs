//! Dataset loading and the bridge to the partitioner
//!
//! The pieces mirror how the radar view consumes data:
//!
//! ```text
//!   RadarLoader ──replace()──▶ DatasetStore ──notify()──▶ LoadNotifier
//!                                   │                         │
//!                          current_dataset()             subscribe()
//!                                   ▼                         ▼
//!                               LoadGate ──partition()──▶ DisplaySink
//!                                                        (BucketBoard)
//! ```
//!
//! - [`DatasetStore`] owns the current dataset and announces replacements
//! - [`LoadGate`] partitions whenever a dataset with trends is available
//! - [`BucketBoard`] keeps the latest published buckets for rendering

pub mod board;
pub mod gate;

use std::path::Path;
use std::sync::{Arc, RwLock};

use tokio::sync::broadcast;

use crate::error::{Error, Result};
use crate::models::TrendDataset;
use crate::storage::TrendRepository;

pub use board::BucketBoard;
pub use gate::{DatasetProvider, DisplaySink, GateOutcome, LoadGate, ReadyGate};

/// Buffered notifications before slow subscribers start lagging
const NOTIFY_CAPACITY: usize = 16;

/// Payload-less "load completed" notification
#[derive(Debug, Clone)]
pub struct LoadNotifier {
    tx: broadcast::Sender<()>,
}

impl LoadNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self { tx }
    }

    /// Announce a completed load; returns how many subscribers were reached
    pub fn notify(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }

    /// Register interest in future loads
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for LoadNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Holder of the current dataset
///
/// Cheap to clone; clones share the same dataset and notifier. Datasets are
/// replaced wholesale and never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    current: Arc<RwLock<Option<Arc<TrendDataset>>>>,
    notifier: LoadNotifier,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current dataset, if one has been loaded
    pub fn current(&self) -> Option<Arc<TrendDataset>> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the dataset and announce the load
    pub fn replace(&self, dataset: TrendDataset) {
        let records = dataset.len();
        {
            let mut guard = match self.current.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            *guard = Some(Arc::new(dataset));
        }

        let reached = self.notifier.notify();
        tracing::debug!(records, subscribers = reached, "Dataset replaced");
    }

    /// Drop the current dataset without notifying
    pub fn clear(&self) {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
    }

    pub fn notifier(&self) -> &LoadNotifier {
        &self.notifier
    }
}

impl DatasetProvider for DatasetStore {
    fn current_dataset(&self) -> Option<Arc<TrendDataset>> {
        self.current()
    }
}

// ============================================================================
// Loaders
// ============================================================================

/// Read a dataset from a JSON file shaped like the radar API response
pub fn load_dataset_from_file(path: &Path) -> Result<TrendDataset> {
    let content = std::fs::read_to_string(path)?;
    let dataset = serde_json::from_str(&content)?;
    Ok(dataset)
}

/// Fetch a dataset from a running radar API (`GET /api/radar`)
pub async fn fetch_dataset(client: &reqwest::Client, url: &str) -> Result<TrendDataset> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(Error::other(format!(
            "Radar endpoint {url} returned {}",
            response.status()
        )));
    }

    Ok(response.json().await?)
}

/// Build a dataset from the trend store
///
/// With no date the latest radar date is used. An empty store yields a
/// dataset with no `trends`, which the gate treats as "not loaded".
pub fn dataset_from_repository(
    repo: &dyn TrendRepository,
    radar_date: Option<&str>,
) -> anyhow::Result<TrendDataset> {
    let date = match radar_date {
        Some(date) => Some(date.to_string()),
        None => repo.latest_radar_date()?,
    };

    let Some(date) = date else {
        return Ok(TrendDataset::default());
    };

    let trends = repo
        .trends_by_date(&date)?
        .into_iter()
        .map(|stored| stored.trend)
        .collect();

    Ok(TrendDataset::from_trends(date, trends))
}
