//! Dataset-readiness gate
//!
//! Runs the partitioner whenever valid data is available: once eagerly at
//! registration if a dataset is already loaded, then once per "load
//! completed" notification. A dataset without `trends` is never partitioned.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};

use super::LoadNotifier;
use crate::metrics;
use crate::models::{TrendDataset, TrendRecord};
use crate::partition::{partition, Taxonomy};

/// Source of the current dataset
pub trait DatasetProvider: Send + Sync {
    fn current_dataset(&self) -> Option<Arc<TrendDataset>>;
}

impl<F> DatasetProvider for F
where
    F: Fn() -> Option<Arc<TrendDataset>> + Send + Sync,
{
    fn current_dataset(&self) -> Option<Arc<TrendDataset>> {
        self()
    }
}

/// Receiver of named bucket collections
pub trait DisplaySink: Send + Sync {
    fn publish(&self, output_key: &str, items: &[&TrendRecord]);
}

impl<F> DisplaySink for F
where
    F: Fn(&str, &[&TrendRecord]) + Send + Sync,
{
    fn publish(&self, output_key: &str, items: &[&TrendRecord]) {
        self(output_key, items)
    }
}

/// Result of one gate check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Every bucket was published
    Published { buckets: usize, matched: usize },
    /// The provider had no dataset
    NoDataset,
    /// The dataset had no `trends` field
    NoTrends,
}

impl GateOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published { .. } => "published",
            Self::NoDataset => "no_dataset",
            Self::NoTrends => "no_trends",
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published { .. })
    }
}

/// Partition-and-publish path guarded by dataset availability
pub struct LoadGate<P, S> {
    taxonomy: Arc<Taxonomy>,
    provider: P,
    sink: S,
    published: AtomicU64,
}

impl<P, S> LoadGate<P, S>
where
    P: DatasetProvider,
    S: DisplaySink,
{
    pub fn new(taxonomy: Arc<Taxonomy>, provider: P, sink: S) -> Self {
        Self {
            taxonomy,
            provider,
            sink,
            published: AtomicU64::new(0),
        }
    }

    /// Read the provider and, if trends are present, partition and publish
    pub fn check_and_publish(&self) -> GateOutcome {
        let outcome = match self.provider.current_dataset() {
            None => GateOutcome::NoDataset,
            Some(dataset) => match dataset.trends.as_deref() {
                None => GateOutcome::NoTrends,
                Some(trends) => self.publish(trends),
            },
        };

        metrics::record_partition_cycle(outcome.as_str());
        if !outcome.is_published() {
            tracing::debug!(outcome = outcome.as_str(), "Nothing to partition");
        }
        outcome
    }

    fn publish(&self, trends: &[TrendRecord]) -> GateOutcome {
        let result = partition(trends, &self.taxonomy);

        for bucket in result.iter() {
            self.sink.publish(bucket.output_key(), &bucket.items);
        }

        self.published.fetch_add(1, Ordering::Relaxed);
        metrics::record_bucket_sizes(result.counts());
        tracing::debug!(
            records = trends.len(),
            matched = result.matched(),
            unmatched = result.unmatched(),
            buckets = result.len(),
            "Published trend buckets"
        );

        GateOutcome::Published {
            buckets: result.len(),
            matched: result.matched(),
        }
    }

    /// Subscribe to future loads, then check once immediately
    ///
    /// Subscribing first means a load that lands between the eager check and
    /// the first wait is still observed.
    pub fn on_ready(self, notifier: &LoadNotifier) -> ReadyGate<P, S> {
        let rx = notifier.subscribe();
        let eager = self.check_and_publish();
        ReadyGate {
            gate: self,
            rx,
            eager,
        }
    }

    /// Number of completed publish cycles
    pub fn publish_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }
}

/// A gate that is subscribed to load notifications
pub struct ReadyGate<P, S> {
    gate: LoadGate<P, S>,
    rx: broadcast::Receiver<()>,
    eager: GateOutcome,
}

impl<P, S> ReadyGate<P, S>
where
    P: DatasetProvider,
    S: DisplaySink,
{
    /// Outcome of the check made at registration
    pub fn eager_outcome(&self) -> GateOutcome {
        self.eager
    }

    pub fn gate(&self) -> &LoadGate<P, S> {
        &self.gate
    }

    /// Wait for one notification and handle it
    ///
    /// Returns `None` once every notifier handle is dropped. Notifications
    /// dropped while this receiver lagged are handled as a single check.
    pub async fn next_load(&mut self) -> Option<GateOutcome> {
        match self.rx.recv().await {
            Ok(()) => Some(self.gate.check_and_publish()),
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Load notifications coalesced");
                Some(self.gate.check_and_publish())
            }
            Err(RecvError::Closed) => None,
        }
    }

    /// Handle notifications until the notifier goes away
    ///
    /// Returns the total number of publish cycles, eager one included.
    pub async fn run(mut self) -> u64 {
        while self.next_load().await.is_some() {}
        tracing::debug!("Load notifier closed");
        self.gate.publish_count()
    }
}
