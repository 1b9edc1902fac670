//! Trend partitioning
//!
//! Groups a flat list of [`TrendRecord`]s into the named buckets of a
//! [`Taxonomy`]. The result borrows the input: buckets hold references, in
//! input order, and every configured bucket is present even when empty.
//!
//! # Example
//!
//! ```
//! use trendradar::models::TrendRecord;
//! use trendradar::partition::{partition, Taxonomy, TaxonomyEntry};
//!
//! let taxonomy = Taxonomy::new(vec![
//!     TaxonomyEntry::new("voice_ai_ux", "signal", "voiceAiSignals"),
//!     TaxonomyEntry::new("voice_ai_ux", "noise", "voiceAiNoise"),
//! ])
//! .unwrap();
//!
//! let records = vec![
//!     TrendRecord::keyed("voice_ai_ux", "signal"),
//!     TrendRecord::keyed("agent_orchestration", "signal"),
//! ];
//!
//! let buckets = partition(&records, &taxonomy);
//! assert_eq!(buckets.get("voiceAiSignals").map(|b| b.len()), Some(1));
//! assert_eq!(buckets.get("voiceAiNoise").map(|b| b.len()), Some(0));
//! assert_eq!(buckets.unmatched(), 1);
//! ```

pub mod taxonomy;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::models::TrendRecord;

pub use taxonomy::{default_entries, Taxonomy, TaxonomyEntry, TaxonomyError};

/// One output bucket
#[derive(Debug, Clone)]
pub struct Bucket<'a> {
    pub entry: &'a TaxonomyEntry,
    pub items: Vec<&'a TrendRecord>,
}

impl<'a> Bucket<'a> {
    pub fn output_key(&self) -> &'a str {
        &self.entry.output_key
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Buckets produced by one [`partition`] call, in taxonomy order
#[derive(Debug, Clone)]
pub struct BucketResult<'a> {
    taxonomy: &'a Taxonomy,
    buckets: Vec<Bucket<'a>>,
    matched: usize,
    unmatched: usize,
}

impl<'a> BucketResult<'a> {
    /// Items of the bucket with this output key
    pub fn get(&self, output_key: &str) -> Option<&[&'a TrendRecord]> {
        self.taxonomy
            .position(output_key)
            .map(|idx| self.buckets[idx].items.as_slice())
    }

    /// Buckets in taxonomy order
    pub fn iter(&self) -> impl Iterator<Item = &Bucket<'a>> {
        self.buckets.iter()
    }

    /// Number of buckets (always the taxonomy size)
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Input records that landed in at least one bucket
    pub fn matched(&self) -> usize {
        self.matched
    }

    /// Input records that landed in no bucket (malformed or unconfigured pair)
    pub fn unmatched(&self) -> usize {
        self.unmatched
    }

    /// `(output_key, item count)` per bucket
    pub fn counts(&self) -> Vec<(&'a str, usize)> {
        self.buckets
            .iter()
            .map(|b| (b.output_key(), b.len()))
            .collect()
    }
}

impl<'a> IntoIterator for BucketResult<'a> {
    type Item = Bucket<'a>;
    type IntoIter = std::vec::IntoIter<Bucket<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter()
    }
}

impl Serialize for BucketResult<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for bucket in &self.buckets {
            map.serialize_entry(bucket.output_key(), &bucket.items)?;
        }
        map.end()
    }
}

/// Partition `records` into the buckets of `taxonomy`
///
/// Single pass: each record is dispatched through the taxonomy's lookup
/// table once. Records without a focus area or classification, or whose
/// pair is not configured, appear in no bucket.
pub fn partition<'a>(records: &'a [TrendRecord], taxonomy: &'a Taxonomy) -> BucketResult<'a> {
    let mut buckets: Vec<Bucket<'a>> = taxonomy
        .entries()
        .iter()
        .map(|entry| Bucket {
            entry,
            items: Vec::new(),
        })
        .collect();

    let mut matched = 0;
    let mut unmatched = 0;

    for record in records {
        let targets = match record.bucket_key() {
            Some((area, class)) => taxonomy.targets(area, class),
            None => &[],
        };

        if targets.is_empty() {
            unmatched += 1;
            continue;
        }

        matched += 1;
        for &idx in targets {
            buckets[idx].items.push(record);
        }
    }

    BucketResult {
        taxonomy,
        buckets,
        matched,
        unmatched,
    }
}
