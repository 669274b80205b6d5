//! Projects extracted role and company values back onto posting lines.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::models::config::LabelingConfig;
use crate::models::line::{Label, LineRecord};
use crate::models::posting::ExtractedFields;
use crate::text::{content_lines, normalize, posting_hash};

use super::pairs::TrainingPair;

/// Role and company values a posting's lines are matched against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets {
    pub role: Option<String>,
    pub company: Option<String>,
}

impl Targets {
    pub fn new(role: Option<&str>, company: Option<&str>) -> Self {
        let keep = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);
        Self {
            role: keep(role),
            company: keep(company),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.company.is_none()
    }
}

impl From<&ExtractedFields> for Targets {
    fn from(fields: &ExtractedFields) -> Self {
        Self::new(fields.role.as_deref(), fields.company.as_deref())
    }
}

/// Line records of one posting.
#[derive(Debug, Clone, Default)]
pub struct LabeledPosting {
    pub records: Vec<LineRecord>,
    /// `other` lines of a posting that had a role or company; the matcher may
    /// have missed an occurrence.
    pub review: Vec<LineRecord>,
}

/// Line records of a batch of training pairs.
#[derive(Debug, Clone, Default)]
pub struct LabelingOutput {
    pub records: Vec<LineRecord>,
    pub review: Vec<LineRecord>,
    pub counts: BTreeMap<Label, usize>,
    /// Pairs that produced at least one line.
    pub postings: usize,
    /// Pairs with blank text.
    pub skipped: usize,
}

/// Label every non-empty line of a posting as role, company or other.
///
/// Role is checked before company; the first match wins.
pub fn label_lines(
    text: &str,
    targets: &Targets,
    source_index: usize,
    config: &LabelingConfig,
) -> LabeledPosting {
    let source_hash = posting_hash(text);
    let role = TargetMatcher::new(targets.role.as_deref(), config);
    let company = TargetMatcher::new(targets.company.as_deref(), config);

    let mut posting = LabeledPosting::default();
    for (line_index, line) in content_lines(text).into_iter().enumerate() {
        let line_norm = normalize(line);
        let label = if role.matches(&line_norm) {
            Label::Role
        } else if company.matches(&line_norm) {
            Label::Company
        } else if role.matches_tokens(&line_norm) {
            Label::Role
        } else if company.matches_tokens(&line_norm) {
            Label::Company
        } else {
            Label::Other
        };

        let record = LineRecord::new(line, label, source_hash.as_str())
            .with_position(source_index, line_index);
        if label == Label::Other && !targets.is_empty() {
            posting.review.push(record.clone());
        }
        posting.records.push(record);
    }

    debug!(
        "Labeled {} lines of posting {} ({} for review)",
        posting.records.len(),
        source_index,
        posting.review.len()
    );
    posting
}

/// Label a batch of training pairs; `source_index` is the pair's position.
pub fn label_pairs(pairs: &[TrainingPair], config: &LabelingConfig) -> LabelingOutput {
    let mut output = LabelingOutput::default();

    for (source_index, pair) in pairs.iter().enumerate() {
        if pair.text.trim().is_empty() {
            output.skipped += 1;
            continue;
        }
        let posting = label_lines(&pair.text, &pair.targets(), source_index, config);
        for record in &posting.records {
            *output.counts.entry(record.label).or_insert(0) += 1;
        }
        output.postings += 1;
        output.records.extend(posting.records);
        output.review.extend(posting.review);
    }

    info!(
        "Labeled {} lines from {} postings ({} skipped)",
        output.records.len(),
        output.postings,
        output.skipped
    );
    output
}

struct TargetMatcher {
    /// Normalized target, padded with spaces for whole-word checks.
    padded: Option<String>,
    tokens: Vec<String>,
    require_word_boundary: bool,
}

impl TargetMatcher {
    fn new(target: Option<&str>, config: &LabelingConfig) -> Self {
        let norm = target.map(normalize).filter(|t| !t.is_empty());
        let tokens = norm
            .as_deref()
            .map(|t| {
                t.split(' ')
                    .take(config.token_fallback_len)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            padded: norm.map(|t| format!(" {t} ")),
            tokens,
            require_word_boundary: config.require_word_boundary,
        }
    }

    /// Substring or whole-word match of the full target.
    fn matches(&self, line_norm: &str) -> bool {
        let Some(padded) = &self.padded else {
            return false;
        };
        let whole_word = format!(" {line_norm} ").contains(padded.as_str());
        whole_word || (!self.require_word_boundary && line_norm.contains(padded.trim()))
    }

    /// Every leading target token occurs somewhere in the line.
    fn matches_tokens(&self, line_norm: &str) -> bool {
        !self.tokens.is_empty() && self.tokens.iter().all(|t| line_norm.contains(t.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(text: &str, role: Option<&str>, company: Option<&str>) -> Vec<Label> {
        label_lines(text, &Targets::new(role, company), 0, &LabelingConfig::default())
            .records
            .iter()
            .map(|r| r.label)
            .collect()
    }

    #[test]
    fn test_sample_posting_labels() {
        let text = "Senior Data Analyst\nAcme Corp · Remote\n\nRequirements:\n- SQL\n- Python\n";
        let posting = label_lines(
            text,
            &Targets::new(Some("Senior Data Analyst"), Some("Acme Corp")),
            4,
            &LabelingConfig::default(),
        );

        let labels: Vec<Label> = posting.records.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec![Label::Role, Label::Company, Label::Other, Label::Other, Label::Other]
        );
        assert_eq!(posting.review.len(), 3);

        let hash = posting_hash(text);
        for (i, record) in posting.records.iter().enumerate() {
            assert_eq!(record.source_hash, hash);
            assert_eq!(record.source_index, Some(4));
            assert_eq!(record.line_index, Some(i));
        }
    }

    #[test]
    fn test_exact_and_decorated_lines() {
        assert_eq!(labels("Data Analyst", Some("Data Analyst"), None), vec![Label::Role]);
        assert_eq!(
            labels("Acme Corp · Bogotá, Colombia", None, Some("Acme Corp")),
            vec![Label::Company]
        );
    }

    #[test]
    fn test_role_wins_over_company() {
        assert_eq!(
            labels("Acme Analytics Analyst", Some("Analyst"), Some("Acme Analytics")),
            vec![Label::Role]
        );
    }

    #[test]
    fn test_token_fallback_ignores_order() {
        assert_eq!(
            labels("Analyst (Data), Senior level", Some("Senior Data Analyst"), None),
            vec![Label::Role]
        );
        assert_eq!(labels("Senior Analyst", Some("Senior Data Analyst"), None), vec![Label::Other]);
    }

    #[test]
    fn test_word_boundary_mode() {
        let config = LabelingConfig {
            require_word_boundary: true,
            token_fallback_len: 3,
        };
        let targets = Targets::new(None, Some("Acme"));
        let strict = label_lines("Acmeville Store", &targets, 0, &config);
        // The token fallback still sees "acme" inside "acmeville".
        assert_eq!(strict.records[0].label, Label::Company);

        let targets = Targets::new(None, Some("Acme Store"));
        let strict = label_lines("Acmeville Stores", &targets, 0, &config);
        assert_eq!(strict.records[0].label, Label::Company);

        let config = LabelingConfig {
            require_word_boundary: true,
            token_fallback_len: 1,
        };
        let targets = Targets::new(None, Some("Store Acme"));
        let strict = label_lines("Acmeville", &targets, 0, &config);
        assert_eq!(strict.records[0].label, Label::Other);
    }

    #[test]
    fn test_no_targets_means_no_review() {
        let posting = label_lines("Line one\nLine two", &Targets::default(), 0, &LabelingConfig::default());
        assert!(posting.records.iter().all(|r| r.label == Label::Other));
        assert!(posting.review.is_empty());
    }

    #[test]
    fn test_label_pairs_counts_and_skips_blank_text() {
        let pairs = vec![
            TrainingPair::from_text("Data Analyst\nAcme Corp\nSQL", Some("Data Analyst"), Some("Acme Corp")),
            TrainingPair::from_text("   ", Some("Data Analyst"), None),
            TrainingPair::from_text("Engineer\nGlobex", Some("Engineer"), None),
        ];
        let output = label_pairs(&pairs, &LabelingConfig::default());

        assert_eq!(output.postings, 2);
        assert_eq!(output.skipped, 1);
        assert_eq!(output.records.len(), 5);
        assert_eq!(output.counts.get(&Label::Role), Some(&2));
        assert_eq!(output.counts.get(&Label::Company), Some(&1));
        assert_eq!(output.counts.get(&Label::Other), Some(&2));
        assert_eq!(output.records[3].source_index, Some(2));
    }

    #[test]
    fn test_line_hash_joins_pair_identity() {
        let pair = TrainingPair::from_text("\n  Data Analyst\nAcme Corp  \n", Some("Data Analyst"), None);
        let output = label_pairs(std::slice::from_ref(&pair), &LabelingConfig::default());

        assert_eq!(output.records.len(), 2);
        assert!(output.records.iter().all(|r| r.source_hash == pair.identity()));
    }
}
