//! Line-level dataset construction and reconciliation.

pub mod labeler;
pub mod oversample;
pub mod pairs;
pub mod reconcile;

pub use labeler::{label_lines, label_pairs, LabeledPosting, LabelingOutput, Targets};
pub use oversample::{oversample, OversampleOutcome};
pub use pairs::{audit_pair, dedupe_pairs, AuditIssue, PairConflict, PairDedupe, TrainingPair};
pub use reconcile::{dedupe, label_counts, merge, DedupeReport, LineIndex, LineKey, MergeOutcome, MergeReport};
