//! Merge and dedupe of line-level datasets.
//!
//! Records are identified by [`LineKey`]: the parent posting's content hash
//! plus the normalized line text. Line positions are not part of the key,
//! because manual correction files often carry different or missing indices.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::models::line::{Label, LineRecord};
use crate::text::normalize;

/// Identity of a training example.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    pub source_hash: String,
    pub line_norm: String,
}

impl LineKey {
    /// Key of a record, normalizing `line` rather than trusting `line_norm`.
    pub fn of(record: &LineRecord) -> Self {
        Self {
            source_hash: record.source_hash.clone(),
            line_norm: normalize(&record.line),
        }
    }
}

/// Insertion-ordered index of records by [`LineKey`].
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    entries: IndexMap<LineKey, LineRecord>,
}

impl LineIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the key is present; returns whether it was inserted.
    pub fn insert_first(&mut self, record: LineRecord) -> bool {
        let key = LineKey::of(&record);
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, record);
        true
    }

    pub fn get_mut(&mut self, key: &LineKey) -> Option<&mut LineRecord> {
        self.entries.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_records(self) -> Vec<LineRecord> {
        self.entries.into_values().collect()
    }
}

impl FromIterator<LineRecord> for LineIndex {
    fn from_iter<I: IntoIterator<Item = LineRecord>>(iter: I) -> Self {
        let mut index = Self::new();
        for record in iter {
            index.insert_first(record);
        }
        index
    }
}

/// Counts reported by every merge pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Base records whose label was overwritten.
    pub updated: usize,
    /// Overlay records appended as new entries.
    pub added: usize,
    /// Records in the merged output.
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub records: Vec<LineRecord>,
    pub report: MergeReport,
}

/// Apply `overlay` labels on top of `base`.
///
/// `base` is deduplicated first (first occurrence wins). An overlay record
/// with a known key overwrites the label when it differs; an unknown key is
/// appended. Base order is kept and new entries follow in overlay order.
pub fn merge(base: Vec<LineRecord>, overlay: Vec<LineRecord>) -> MergeOutcome {
    let mut index: LineIndex = base.into_iter().collect();
    let mut report = MergeReport::default();

    for mut record in overlay {
        let key = LineKey::of(&record);
        match index.get_mut(&key) {
            Some(existing) => {
                if existing.label != record.label {
                    debug!(
                        "Relabeling {:?} from {} to {}",
                        existing.line, existing.label, record.label
                    );
                    existing.label = record.label;
                    report.updated += 1;
                }
            }
            None => {
                record.line_norm = key.line_norm;
                index.insert_first(record);
                report.added += 1;
            }
        }
    }

    report.total = index.len();
    info!(
        "Merged datasets: {} updated, {} added, {} total",
        report.updated, report.added, report.total
    );

    MergeOutcome {
        records: index.into_records(),
        report,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupeReport {
    pub input: usize,
    pub output: usize,
    pub removed: usize,
}

/// Keep the first record per [`LineKey`].
pub fn dedupe(records: Vec<LineRecord>) -> (Vec<LineRecord>, DedupeReport) {
    let input = records.len();
    let records = records.into_iter().collect::<LineIndex>().into_records();
    let report = DedupeReport {
        input,
        output: records.len(),
        removed: input - records.len(),
    };
    info!("Deduplicated {} records to {}", report.input, report.output);
    (records, report)
}

/// Number of records per label; every label is present.
pub fn label_counts(records: &[LineRecord]) -> BTreeMap<Label, usize> {
    let mut counts: BTreeMap<Label, usize> = Label::ALL.iter().map(|l| (*l, 0)).collect();
    for record in records {
        *counts.entry(record.label).or_insert(0) += 1;
    }
    counts
}
