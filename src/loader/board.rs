//! In-memory display sink holding the latest published buckets

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::DisplaySink;
use crate::models::TrendRecord;

#[derive(Debug, Default)]
struct BoardState {
    buckets: BTreeMap<String, Vec<TrendRecord>>,
    publishes: u64,
}

/// Latest bucket contents keyed by output key
///
/// Each publish replaces the named bucket (last write wins). Clones share
/// state, so one handle can be given to a gate and another kept for reading.
#[derive(Debug, Clone, Default)]
pub struct BucketBoard {
    state: Arc<RwLock<BoardState>>,
}

impl BucketBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items currently shown for `output_key`
    pub fn items(&self, output_key: &str) -> Option<Vec<TrendRecord>> {
        self.read(|state| state.buckets.get(output_key).cloned())
    }

    /// Output keys published so far, sorted
    pub fn keys(&self) -> Vec<String> {
        self.read(|state| state.buckets.keys().cloned().collect())
    }

    /// Total number of `publish` calls received
    pub fn publish_count(&self) -> u64 {
        self.read(|state| state.publishes)
    }

    /// Copy of every bucket
    pub fn snapshot(&self) -> BTreeMap<String, Vec<TrendRecord>> {
        self.read(|state| state.buckets.clone())
    }

    fn read<T>(&self, f: impl FnOnce(&BoardState) -> T) -> T {
        match self.state.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }
}

impl DisplaySink for BucketBoard {
    fn publish(&self, output_key: &str, items: &[&TrendRecord]) {
        let owned: Vec<TrendRecord> = items.iter().map(|r| (*r).clone()).collect();
        let mut guard = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.buckets.insert(output_key.to_string(), owned);
        guard.publishes += 1;
    }
}
