//! Minority-class oversampling.
//!
//! Duplicates existing records; never a source of new information. Output
//! belongs in its own file, never over the canonical dataset.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::error::ReconcileError;
use crate::models::line::{Label, LineRecord};

use super::reconcile::label_counts;

#[derive(Debug, Clone)]
pub struct OversampleOutcome {
    /// Shuffled records, duplicates included.
    pub records: Vec<LineRecord>,
    pub before: BTreeMap<Label, usize>,
    pub after: BTreeMap<Label, usize>,
    /// Duplicates appended.
    pub added: usize,
}

/// Number of `label` records wanted for `ratio` of a dataset of `total`.
pub fn desired_count(total: usize, ratio: f64) -> usize {
    (ratio * total as f64 / (1.0 - ratio)).floor() as usize
}

/// Duplicate random `label` records (with replacement) until the label reaches
/// `desired_count(total, ratio)`, then shuffle everything.
///
/// A dataset without any `label` record is returned unchanged.
pub fn oversample<R: Rng + ?Sized>(
    records: Vec<LineRecord>,
    label: Label,
    ratio: f64,
    rng: &mut R,
) -> Result<OversampleOutcome, ReconcileError> {
    if !(ratio > 0.0 && ratio < 1.0) {
        return Err(ReconcileError::InvalidRatio(ratio));
    }

    let before = label_counts(&records);
    let current = before.get(&label).copied().unwrap_or(0);
    if current == 0 {
        warn!("No '{}' records to oversample; dataset left unchanged", label);
        return Ok(OversampleOutcome {
            after: before.clone(),
            before,
            records,
            added: 0,
        });
    }

    let desired = desired_count(records.len(), ratio);
    let needed = desired.saturating_sub(current);
    info!(
        "{} records, {} '{}': adding {} duplicates for ratio {}",
        records.len(),
        current,
        label,
        needed,
        ratio
    );

    let minority: Vec<LineRecord> = records.iter().filter(|r| r.label == label).cloned().collect();
    let mut output = records;
    output.reserve(needed);
    for _ in 0..needed {
        if let Some(record) = minority.choose(rng) {
            output.push(record.clone());
        }
    }
    output.shuffle(rng);

    Ok(OversampleOutcome {
        after: label_counts(&output),
        before,
        records: output,
        added: needed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn dataset(companies: usize, others: usize) -> Vec<LineRecord> {
        let company = (0..companies).map(|i| LineRecord::new(format!("Company {i}"), Label::Company, "h"));
        let other = (0..others).map(|i| LineRecord::new(format!("line {i}"), Label::Other, "h"));
        company.chain(other).collect()
    }

    #[test]
    fn test_desired_count() {
        assert_eq!(desired_count(100, 0.25), 33);
        assert_eq!(desired_count(10, 0.5), 10);
    }

    #[test]
    fn test_reaches_target_without_reducing_any_label() {
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = oversample(dataset(5, 95), Label::Company, 0.25, &mut rng).unwrap();

        assert_eq!(outcome.added, 28);
        assert_eq!(outcome.after[&Label::Company], 33);
        assert_eq!(outcome.after[&Label::Other], 95);
        assert_eq!(outcome.records.len(), 128);
        for label in Label::ALL {
            assert!(outcome.after[&label] >= outcome.before[&label]);
        }
        assert!(outcome
            .records
            .iter()
            .filter(|r| r.label == Label::Company)
            .all(|r| r.line.starts_with("Company ")));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let a = oversample(dataset(3, 20), Label::Company, 0.4, &mut StdRng::seed_from_u64(1)).unwrap();
        let b = oversample(dataset(3, 20), Label::Company, 0.4, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(a.records, b.records);
    }

    #[test]
    fn test_already_balanced_only_shuffles() {
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = oversample(dataset(50, 50), Label::Company, 0.25, &mut rng).unwrap();
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.records.len(), 100);
    }

    #[test]
    fn test_no_minority_records_is_a_no_op() {
        let mut rng = StdRng::seed_from_u64(3);
        let records = dataset(0, 10);
        let outcome = oversample(records.clone(), Label::Company, 0.25, &mut rng).unwrap();
        assert_eq!(outcome.records, records);
        assert_eq!(outcome.added, 0);
    }

    #[test]
    fn test_invalid_ratio() {
        let mut rng = StdRng::seed_from_u64(3);
        for ratio in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                oversample(dataset(1, 1), Label::Company, ratio, &mut rng),
                Err(ReconcileError::InvalidRatio(_))
            ));
        }
    }
}
