//! Rule-based field extractors for job postings.
//!
//! Each field is extracted by a [`Chain`]: an ordered list of named rules.
//! A rule proposes candidates in order; the first candidate accepted by the
//! rule's validator wins and later rules are not consulted.

pub mod company;
pub mod dates;
pub mod deny;
pub mod description;
pub mod markers;
pub mod patterns;
pub mod requirements;
pub mod role;
pub mod work_mode;

use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::models::config::ExtractionConfig;
use crate::models::posting::{Field, WorkMode};
use crate::text::{content_lines, normalize};
use markers::marker_remainder;

pub use company::company_chain;
pub use dates::{date_chain, parse_date};
pub use deny::DenyList;
pub use description::description_chain;
pub use requirements::requirements_chain;
pub use role::role_chain;
pub use work_mode::work_mode_chain;

/// Produces ordered candidates from a posting.
pub type Matcher<T> = fn(&PostingContext<'_>) -> Vec<T>;

/// Accepts or rejects a candidate.
pub type Validator<T> = fn(&PostingContext<'_>, &T) -> bool;

/// A named matcher with an optional validator.
pub struct Rule<T> {
    pub name: &'static str,
    matcher: Matcher<T>,
    validator: Option<Validator<T>>,
}

impl<T> Rule<T> {
    pub fn new(name: &'static str, matcher: Matcher<T>) -> Self {
        Self {
            name,
            matcher,
            validator: None,
        }
    }

    pub fn validated_by(mut self, validator: Validator<T>) -> Self {
        self.validator = Some(validator);
        self
    }

    fn accepts(&self, ctx: &PostingContext<'_>, value: &T) -> bool {
        self.validator.is_none_or(|v| v(ctx, value))
    }
}

/// Value accepted by a chain and the rule that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch<T> {
    pub value: T,
    pub rule: &'static str,
}

/// Ordered rules for one field.
pub struct Chain<T> {
    field: Field,
    rules: Vec<Rule<T>>,
}

impl<T: fmt::Debug> Chain<T> {
    pub fn new(field: Field) -> Self {
        Self {
            field,
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: Rule<T>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    /// Run the rules in order and return the first accepted candidate.
    pub fn run(&self, ctx: &PostingContext<'_>) -> Option<RuleMatch<T>> {
        for rule in &self.rules {
            for candidate in (rule.matcher)(ctx) {
                if rule.accepts(ctx, &candidate) {
                    debug!("{}: rule '{}' matched {:?}", self.field, rule.name, candidate);
                    return Some(RuleMatch {
                        value: candidate,
                        rule: rule.name,
                    });
                }
                trace!("{}: rule '{}' rejected {:?}", self.field, rule.name, candidate);
            }
        }
        debug!("{}: no rule matched", self.field);
        None
    }
}

/// Compiled vocabularies used by every rule.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    pub config: ExtractionConfig,
    pub role_markers: HashSet<String>,
    pub company_markers: HashSet<String>,
    pub date_markers: HashSet<String>,
    pub work_mode_markers: HashSet<String>,
    pub description_markers: HashSet<String>,
    pub requirement_headers: HashSet<String>,
    /// Union of every marker and header above.
    pub field_markers: HashSet<String>,
    pub deny: DenyList,
    role_keywords: Option<Regex>,
    work_modes: Vec<(WorkMode, Regex)>,
}

impl ExtractionRules {
    /// Compile vocabularies and patterns from configuration.
    pub fn compile(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        let work_modes = [
            (WorkMode::Remoto, &config.work_mode_synonyms.remote),
            (WorkMode::Hibrido, &config.work_mode_synonyms.hybrid),
            (WorkMode::Presencial, &config.work_mode_synonyms.onsite),
        ]
        .into_iter()
        .filter_map(|(mode, synonyms)| word_alternation(synonyms).map(|p| (mode, p)))
        .map(|(mode, pattern)| compile_pattern(&pattern).map(|re| (mode, re)))
        .collect::<Result<Vec<_>, _>>()?;

        let role_keywords = word_alternation(&config.role_keywords)
            .map(|p| compile_pattern(&p))
            .transpose()?;

        let role_markers = normalized_set(&config.role_markers);
        let company_markers = normalized_set(&config.company_markers);
        let date_markers = normalized_set(&config.date_markers);
        let work_mode_markers = normalized_set(&config.work_mode_markers);
        let description_markers = normalized_set(&config.description_markers);
        let requirement_headers = normalized_set(&config.requirement_headers);
        let field_markers = [
            &role_markers,
            &company_markers,
            &date_markers,
            &work_mode_markers,
            &description_markers,
            &requirement_headers,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect();

        Ok(Self {
            role_markers,
            company_markers,
            date_markers,
            work_mode_markers,
            description_markers,
            requirement_headers,
            field_markers,
            deny: DenyList::from_config(config)?,
            role_keywords,
            work_modes,
            config: config.clone(),
        })
    }

    /// Whether the text contains a job-title word.
    pub fn has_role_keyword(&self, text: &str) -> bool {
        let norm = normalize(text);
        self.role_keywords.as_ref().is_some_and(|re| re.is_match(&norm))
    }

    /// Work mode whose synonym occurs earliest in the text.
    pub fn work_mode_in(&self, text: &str) -> Option<WorkMode> {
        let norm = normalize(text);
        self.work_modes
            .iter()
            .filter_map(|(mode, re)| re.find(&norm).map(|m| (m.start(), *mode)))
            .min_by_key(|(start, _)| *start)
            .map(|(_, mode)| mode)
    }

    /// The value is only a work-mode word, e.g. "Remote" or "(Híbrido)".
    pub fn is_work_mode_only(&self, value: &str) -> bool {
        let norm = normalize(value);
        !norm.is_empty()
            && self
                .work_modes
                .iter()
                .any(|(_, re)| re.find(&norm).is_some_and(|m| m.start() == 0 && m.end() == norm.len()))
    }

    /// The value opens with a field label such as `Empresa:` or `Requisitos`.
    pub fn is_marker_line(&self, value: &str) -> bool {
        marker_remainder(value, &self.field_markers).is_some()
    }

    /// Deny-listed, metadata, location or a bare work mode.
    pub fn is_noise(&self, value: &str) -> bool {
        self.deny.rejects(value) || self.is_work_mode_only(value)
    }
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self::compile(&ExtractionConfig::default()).expect("default extraction config compiles")
    }
}

/// A posting prepared for rule evaluation.
pub struct PostingContext<'a> {
    /// Raw posting text.
    pub text: &'a str,
    /// Non-empty trimmed lines.
    pub lines: Vec<&'a str>,
    pub rules: &'a ExtractionRules,
    /// Normalized role, once extracted.
    pub role_norm: Option<String>,
}

impl<'a> PostingContext<'a> {
    pub fn new(text: &'a str, rules: &'a ExtractionRules) -> Self {
        Self {
            text,
            lines: content_lines(text),
            rules,
            role_norm: None,
        }
    }

    pub fn with_role(mut self, role: Option<&str>) -> Self {
        self.role_norm = role.map(normalize).filter(|r| !r.is_empty());
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.rules.config
    }
}

fn normalized_set(items: &[String]) -> HashSet<String> {
    items
        .iter()
        .map(|s| normalize(s))
        .filter(|s| !s.is_empty())
        .collect()
}

/// `\b(?:a|b c)\b` over normalized, escaped terms; `None` when empty.
fn word_alternation(terms: &[String]) -> Option<String> {
    let mut escaped: Vec<String> = terms
        .iter()
        .map(|t| normalize(t))
        .filter(|t| !t.is_empty())
        .map(|t| regex::escape(&t))
        .collect();
    if escaped.is_empty() {
        return None;
    }
    // Longest first so "on site" wins over "on".
    escaped.sort_by_key(|t| std::cmp::Reverse(t.len()));
    escaped.dedup();
    Some(format!(r"\b(?:{})\b", escaped.join("|")))
}

fn compile_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}
