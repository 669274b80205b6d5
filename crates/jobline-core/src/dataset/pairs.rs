//! Training pairs: a posting's raw text with the fields extracted from it.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::posting::ExtractedFields;
use crate::posting::rules::ExtractionRules;
use crate::text::{normalize, posting_hash};

use super::labeler::Targets;

lazy_static! {
    static ref YAML_CARGO: Regex =
        Regex::new(r#"(?m)^[ \t]*cargo:[ \t]*(?:"([^"]*)"|'([^']*)'|(.*?))[ \t\r]*$"#).unwrap();
    static ref YAML_EMPRESA: Regex =
        Regex::new(r#"(?m)^[ \t]*empresa:[ \t]*(?:"([^"]*)"|'([^']*)'|(.*?))[ \t\r]*$"#).unwrap();
}

/// One line of `training_data.jsonl`.
///
/// Targets come from `fields`, else the top-level `cargo`/`empresa`, else a
/// legacy `yaml` string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPair {
    #[serde(default)]
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<ExtractedFields>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empresa: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yaml: Option<String>,
}

impl TrainingPair {
    /// Pair written by the extractor.
    pub fn from_extraction(text: impl Into<String>, fields: ExtractedFields) -> Self {
        Self {
            text: text.into(),
            fields: Some(fields),
            ..Self::default()
        }
    }

    /// Pair with bare role and company targets.
    pub fn from_text(text: impl Into<String>, cargo: Option<&str>, empresa: Option<&str>) -> Self {
        Self {
            text: text.into(),
            cargo: cargo.map(str::to_string),
            empresa: empresa.map(str::to_string),
            ..Self::default()
        }
    }

    /// Role and company to match lines against.
    pub fn targets(&self) -> Targets {
        if let Some(fields) = &self.fields {
            return Targets::from(fields);
        }
        if self.cargo.is_some() || self.empresa.is_some() {
            return Targets::new(self.cargo.as_deref(), self.empresa.as_deref());
        }
        match &self.yaml {
            Some(yaml) => Targets::new(
                yaml_value(&YAML_CARGO, yaml).as_deref(),
                yaml_value(&YAML_EMPRESA, yaml).as_deref(),
            ),
            None => Targets::default(),
        }
    }

    /// Identity of the posting; equals the `source_hash` of its labeled lines.
    pub fn identity(&self) -> String {
        posting_hash(&self.text)
    }

    fn same_annotation(&self, other: &Self) -> bool {
        self.fields == other.fields
            && self.cargo == other.cargo
            && self.empresa == other.empresa
            && self.yaml == other.yaml
    }
}

fn yaml_value(pattern: &Regex, yaml: &str) -> Option<String> {
    let caps = pattern.captures(yaml)?;
    let value = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
    Some(value.as_str().trim().to_string())
}

/// Same posting text annotated differently by two pairs.
#[derive(Debug, Clone, Serialize)]
pub struct PairConflict {
    pub source_hash: String,
    pub kept: TrainingPair,
    pub others: Vec<TrainingPair>,
}

/// Result of [`dedupe_pairs`].
#[derive(Debug, Clone, Default)]
pub struct PairDedupe {
    pub pairs: Vec<TrainingPair>,
    pub conflicts: Vec<PairConflict>,
    /// Pairs dropped, conflicting or not.
    pub removed: usize,
}

/// Keep the first pair per posting text.
///
/// Later pairs with the same text but a different annotation are kept aside
/// as conflicts for manual inspection.
pub fn dedupe_pairs(pairs: Vec<TrainingPair>) -> PairDedupe {
    let mut kept: IndexMap<String, TrainingPair> = IndexMap::new();
    let mut conflicts: IndexMap<String, Vec<TrainingPair>> = IndexMap::new();
    let mut removed = 0;

    for pair in pairs {
        let key = pair.identity();
        match kept.get(&key) {
            None => {
                kept.insert(key, pair);
            }
            Some(first) => {
                removed += 1;
                if !first.same_annotation(&pair) {
                    debug!("Conflicting annotation for posting {}", key);
                    conflicts.entry(key).or_default().push(pair);
                }
            }
        }
    }

    let conflicts: Vec<PairConflict> = conflicts
        .into_iter()
        .filter_map(|(source_hash, others)| {
            let kept = kept.get(&source_hash)?.clone();
            Some(PairConflict {
                source_hash,
                kept,
                others,
            })
        })
        .collect();
    if !conflicts.is_empty() {
        warn!("{} postings have conflicting annotations", conflicts.len());
    }

    PairDedupe {
        pairs: kept.into_values().collect(),
        conflicts,
        removed,
    }
}

/// Suspicious extraction found by [`audit_pair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditIssue {
    EmptyCompany,
    MetadataAsCompany,
    RoleEqualsCompany,
}

impl AuditIssue {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditIssue::EmptyCompany => "empty_company",
            AuditIssue::MetadataAsCompany => "metadata_as_company",
            AuditIssue::RoleEqualsCompany => "role_equals_company",
        }
    }
}

impl std::fmt::Display for AuditIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First problem with a pair's company target, if any.
pub fn audit_pair(pair: &TrainingPair, rules: &ExtractionRules) -> Option<AuditIssue> {
    let targets = pair.targets();
    let Some(company) = targets.company.as_deref() else {
        return Some(AuditIssue::EmptyCompany);
    };
    if rules.deny.has_boilerplate(company) || rules.deny.is_denied_phrase(company) {
        return Some(AuditIssue::MetadataAsCompany);
    }
    let same_as_role = targets
        .role
        .as_deref()
        .is_some_and(|role| normalize(role) == normalize(company));
    same_as_role.then_some(AuditIssue::RoleEqualsCompany)
}
