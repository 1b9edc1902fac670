//! Bucket taxonomy: which `(focus_area, classification)` pairs become
//! named buckets.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::TrendRecord;

/// Errors raised while building a taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    #[error("Duplicate output key in taxonomy: {0}")]
    DuplicateOutputKey(String),

    #[error("Empty output key in taxonomy entry {0}")]
    EmptyOutputKey(usize),
}

/// One configured bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub focus_area: String,
    pub classification: String,
    pub output_key: String,
}

impl TaxonomyEntry {
    pub fn new(
        focus_area: impl Into<String>,
        classification: impl Into<String>,
        output_key: impl Into<String>,
    ) -> Self {
        Self {
            focus_area: focus_area.into(),
            classification: classification.into(),
            output_key: output_key.into(),
        }
    }

    /// Both keys of the record equal this entry's keys
    pub fn matches(&self, record: &TrendRecord) -> bool {
        record
            .bucket_key()
            .is_some_and(|(area, class)| area == self.focus_area && class == self.classification)
    }
}

/// Validated, immutable bucket configuration
///
/// Built once at setup. Holds a dispatch table from focus area to
/// classification to bucket indices so that each record costs two hash
/// lookups regardless of how many buckets exist.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    entries: Vec<TaxonomyEntry>,
    dispatch: HashMap<String, HashMap<String, Vec<usize>>>,
    positions: HashMap<String, usize>,
}

impl Taxonomy {
    /// Validate entries and build the taxonomy
    pub fn new(entries: Vec<TaxonomyEntry>) -> Result<Self, TaxonomyError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if entry.output_key.trim().is_empty() {
                return Err(TaxonomyError::EmptyOutputKey(idx));
            }
            if !seen.insert(entry.output_key.as_str()) {
                return Err(TaxonomyError::DuplicateOutputKey(entry.output_key.clone()));
            }
        }

        Ok(Self::build(entries))
    }

    /// The radar's six buckets: three focus areas by signal/noise
    pub fn radar_default() -> Self {
        Self::build(default_entries())
    }

    // Callers guarantee distinct, non-empty output keys.
    fn build(entries: Vec<TaxonomyEntry>) -> Self {
        let mut dispatch: HashMap<String, HashMap<String, Vec<usize>>> = HashMap::new();
        let mut positions = HashMap::with_capacity(entries.len());

        for (idx, entry) in entries.iter().enumerate() {
            dispatch
                .entry(entry.focus_area.clone())
                .or_default()
                .entry(entry.classification.clone())
                .or_default()
                .push(idx);
            positions.insert(entry.output_key.clone(), idx);
        }

        Self {
            entries,
            dispatch,
            positions,
        }
    }

    /// Configured entries in declaration order
    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bucket index for an output key
    pub fn position(&self, output_key: &str) -> Option<usize> {
        self.positions.get(output_key).copied()
    }

    /// Bucket indices a `(focus_area, classification)` pair dispatches to
    pub(crate) fn targets(&self, focus_area: &str, classification: &str) -> &[usize] {
        self.dispatch
            .get(focus_area)
            .and_then(|by_class| by_class.get(classification))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::radar_default()
    }
}

impl TryFrom<Vec<TaxonomyEntry>> for Taxonomy {
    type Error = TaxonomyError;

    fn try_from(entries: Vec<TaxonomyEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

/// Entries of the default radar taxonomy
pub fn default_entries() -> Vec<TaxonomyEntry> {
    vec![
        TaxonomyEntry::new("voice_ai_ux", "signal", "voiceAiSignals"),
        TaxonomyEntry::new("voice_ai_ux", "noise", "voiceAiNoise"),
        TaxonomyEntry::new("agent_orchestration", "signal", "agentOrchSignals"),
        TaxonomyEntry::new("agent_orchestration", "noise", "agentOrchNoise"),
        TaxonomyEntry::new("durable_runtime", "signal", "durableRuntimeSignals"),
        TaxonomyEntry::new("durable_runtime", "noise", "durableRuntimeNoise"),
    ]
}
