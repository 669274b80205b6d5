//! Heuristic posting extractor built from per-field rule chains.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::models::config::ExtractionConfig;
use crate::models::posting::{ExtractedFields, Field, FieldPresence, WorkMode};
use crate::text::normalize;

use super::rules::{
    company_chain, date_chain, description_chain, requirements_chain, role_chain,
    work_mode_chain, Chain, ExtractionRules, PostingContext,
};
use super::PostingExtractor;

/// Warning attached when the posting date had to be defaulted.
pub const DATE_DEFAULTED_WARNING: &str = "date not found; defaulted to processing date";

/// Where the `fecha` value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateSource {
    /// Found in the posting text.
    Posting,
    /// The extractor's reference date, usually the day of processing.
    Processing,
}

/// Result of extracting one posting.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub fields: ExtractedFields,
    /// Which fields were actually found.
    pub presence: FieldPresence,
    pub date_source: DateSource,
    /// Winning rule per found field.
    pub rules: BTreeMap<Field, &'static str>,
    /// Posting text the fields were extracted from.
    pub raw_text: String,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Rule-chain extractor for job postings.
pub struct HeuristicExtractor {
    rules: ExtractionRules,
    reference_date: Option<NaiveDate>,
    role: Chain<String>,
    company: Chain<String>,
    date: Chain<NaiveDate>,
    work_mode: Chain<WorkMode>,
    description: Chain<String>,
    requirements: Chain<Vec<String>>,
}

impl HeuristicExtractor {
    /// Create an extractor from compiled rules.
    pub fn new(rules: ExtractionRules) -> Self {
        Self {
            rules,
            reference_date: None,
            role: role_chain(),
            company: company_chain(),
            date: date_chain(),
            work_mode: work_mode_chain(),
            description: description_chain(),
            requirements: requirements_chain(),
        }
    }

    /// Compile the configuration and create an extractor.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(ExtractionRules::compile(config)?))
    }

    /// Use a fixed date instead of today when no posting date is found.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn rules(&self) -> &ExtractionRules {
        &self.rules
    }

    fn reference_date(&self) -> NaiveDate {
        self.reference_date.unwrap_or_else(|| Local::now().date_naive())
    }
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self::new(ExtractionRules::default())
    }
}

impl PostingExtractor for HeuristicExtractor {
    fn extract(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();
        let mut rules = BTreeMap::new();
        let mut presence = FieldPresence::default();
        let config = &self.rules.config;

        debug!("Extracting posting from {} characters of text", text.len());

        let ctx = PostingContext::new(text, &self.rules);
        let role = self.role.run(&ctx);
        let ctx = ctx.with_role(role.as_ref().map(|m| m.value.as_str()));

        let role = record(&mut rules, Field::Role, role);
        let mut company = record(&mut rules, Field::Company, self.company.run(&ctx));

        // Rules already skip a company equal to the role; keep the record invariant regardless.
        let same = matches!((&role, &company), (Some(r), Some(c)) if normalize(r) == normalize(c));
        if same {
            warnings.push("company equals role; company cleared".to_string());
            rules.remove(&Field::Company);
            company = None;
        }

        let date = record(&mut rules, Field::Date, self.date.run(&ctx));
        let date_source = if date.is_some() {
            DateSource::Posting
        } else {
            warnings.push(DATE_DEFAULTED_WARNING.to_string());
            DateSource::Processing
        };

        let work_mode = record(&mut rules, Field::WorkMode, self.work_mode.run(&ctx));
        let description = record(&mut rules, Field::Description, self.description.run(&ctx));
        let requirements = record(&mut rules, Field::Requirements, self.requirements.run(&ctx));

        presence.role = role.is_some();
        presence.company = company.is_some();
        presence.date = date.is_some();
        presence.work_mode = work_mode.is_some();
        presence.description = description.is_some();
        presence.requirements = requirements.is_some();

        for (field, found) in presence.iter() {
            if !found && field != Field::Date {
                warnings.push(format!("{field} not found"));
            }
        }

        let fields = ExtractedFields {
            role,
            company,
            date: date.unwrap_or_else(|| self.reference_date()),
            work_mode,
            description: description.unwrap_or_else(|| config.description_placeholder.clone()),
            requirements: requirements
                .unwrap_or_else(|| config.requirements_sentinel.iter().cloned().collect()),
        };

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Extracted posting in {}ms ({} warnings)",
            processing_time_ms,
            warnings.len()
        );

        ExtractionResult {
            fields,
            presence,
            date_source,
            rules,
            raw_text: text.to_string(),
            warnings,
            processing_time_ms,
        }
    }
}

fn record<T>(
    rules: &mut BTreeMap<Field, &'static str>,
    field: Field,
    found: Option<super::rules::RuleMatch<T>>,
) -> Option<T> {
    found.map(|m| {
        rules.insert(field, m.rule);
        m.value
    })
}
