//! Company-candidate scoring for prioritized review.
//!
//! Scores are an independent weak signal used to order lines for human
//! review and to bootstrap company labels; they are never ground truth.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::models::config::CandidateConfig;
use crate::models::line::{Label, LineRecord};
use crate::posting::rules::patterns::{COMPANY_SUFFIX, LOGO_TOKEN};
use crate::posting::rules::ExtractionRules;

/// Why a line scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reason {
    Indicator,
    Logo,
    TitleCase,
    Metadata,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Indicator => "indicator",
            Reason::Logo => "logo",
            Reason::TitleCase => "titlecase",
            Reason::Metadata => "metadata",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateScore {
    pub score: i32,
    pub reasons: BTreeSet<Reason>,
}

impl CandidateScore {
    /// Reasons joined by `|`, e.g. `indicator|titlecase`.
    pub fn reason_tags(&self) -> String {
        self.reasons
            .iter()
            .map(Reason::as_str)
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// Additive company-likelihood scorer.
pub struct CandidateScorer<'a> {
    rules: &'a ExtractionRules,
    config: CandidateConfig,
}

impl<'a> CandidateScorer<'a> {
    pub fn new(rules: &'a ExtractionRules, config: CandidateConfig) -> Self {
        Self { rules, config }
    }

    pub fn score(&self, line: &str) -> CandidateScore {
        let line = line.trim();
        let mut result = CandidateScore::default();

        if COMPANY_SUFFIX.is_match(line) {
            result.score += self.config.indicator_weight;
            result.reasons.insert(Reason::Indicator);
        }
        if LOGO_TOKEN.is_match(line) {
            result.score += self.config.logo_weight;
            result.reasons.insert(Reason::Logo);
        }
        if self.is_short_title_case(line) && !self.rules.has_role_keyword(line) {
            result.score += self.config.titlecase_weight;
            result.reasons.insert(Reason::TitleCase);
        }
        if self.is_metadata(line) {
            result.score -= self.config.metadata_penalty;
            result.reasons.insert(Reason::Metadata);
        }
        result
    }

    /// Word count in the configured window and a strict majority capitalized.
    fn is_short_title_case(&self, line: &str) -> bool {
        let words: Vec<&str> = line.split_whitespace().collect();
        let window = self.config.titlecase_min_words..=self.config.titlecase_max_words;
        if !window.contains(&words.len()) {
            return false;
        }
        let capitalized = words
            .iter()
            .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
            .count();
        capitalized * 2 > words.len()
    }

    fn is_metadata(&self, line: &str) -> bool {
        let deny = &self.rules.deny;
        deny.has_boilerplate(line) || deny.is_denied_phrase(line) || self.rules.work_mode_in(line).is_some()
    }
}

/// A scored line, as written to the candidate CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRecord {
    pub line: String,
    pub label: Label,
    pub source_hash: String,
    pub source_index: Option<usize>,
    pub line_index: Option<usize>,
    pub reason: String,
    pub score: i32,
    /// Label before auto-labeling.
    pub orig_label: Option<Label>,
    pub auto_labeled: Option<bool>,
}

/// Lines with a positive score, best first.
///
/// Ties are broken by earlier position (`source_index`, then `line_index`);
/// records without a position sort last. `limit` applies after sorting.
pub fn extract_candidates(
    records: &[LineRecord],
    scorer: &CandidateScorer<'_>,
    limit: Option<usize>,
) -> Vec<CandidateRecord> {
    let mut candidates: Vec<CandidateRecord> = records
        .iter()
        .filter(|r| !r.line.trim().is_empty())
        .filter_map(|r| {
            let scored = scorer.score(&r.line);
            (scored.score > 0).then(|| CandidateRecord {
                line: r.line.trim().to_string(),
                label: r.label,
                source_hash: r.source_hash.clone(),
                source_index: r.source_index,
                line_index: r.line_index,
                reason: scored.reason_tags(),
                score: scored.score,
                orig_label: None,
                auto_labeled: None,
            })
        })
        .collect();

    candidates.sort_by_key(|c| {
        (
            Reverse(c.score),
            c.source_index.is_none(),
            c.source_index,
            c.line_index.is_none(),
            c.line_index,
        )
    });
    if let Some(limit) = limit {
        candidates.truncate(limit);
    }

    info!("Found {} company candidates in {} lines", candidates.len(), records.len());
    candidates
}

/// Mark candidates scoring at least `threshold` as company.
///
/// Every row records its original label; returns the number relabeled.
pub fn auto_label(candidates: &mut [CandidateRecord], threshold: i32) -> usize {
    let mut relabeled = 0;
    for candidate in candidates.iter_mut() {
        candidate.orig_label = Some(candidate.label);
        let relabel = candidate.score >= threshold && candidate.label != Label::Company;
        if relabel {
            candidate.label = Label::Company;
            relabeled += 1;
        }
        candidate.auto_labeled = Some(relabel);
    }
    relabeled
}
