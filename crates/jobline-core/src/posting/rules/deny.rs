//! Boilerplate deny list shared by role and company extraction.

use std::collections::HashSet;

use regex::Regex;

use super::normalized_set;
use crate::error::ConfigError;
use crate::models::config::ExtractionConfig;
use crate::text::normalize;

/// UI chrome, metadata and place names that are never a field value.
#[derive(Debug, Clone)]
pub struct DenyList {
    phrases: HashSet<String>,
    patterns: Vec<Regex>,
    locations: HashSet<String>,
}

impl DenyList {
    /// Build from configuration, compiling the boilerplate patterns.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        let patterns = config
            .boilerplate_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| ConfigError::Pattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            phrases: normalized_set(&config.deny_phrases),
            patterns,
            locations: normalized_set(&config.location_terms),
        })
    }

    /// The whole value is a deny-listed phrase.
    pub fn is_denied_phrase(&self, value: &str) -> bool {
        self.phrases.contains(&normalize(value))
    }

    /// The value contains metadata such as "3 days ago" or "50 applicants".
    pub fn has_boilerplate(&self, value: &str) -> bool {
        let norm = normalize(value);
        self.patterns.iter().any(|p| p.is_match(&norm))
    }

    /// The value is a place name or a comma-separated list of place names.
    pub fn is_location(&self, value: &str) -> bool {
        let norm = normalize(value);
        if norm.is_empty() {
            return false;
        }
        if self.locations.contains(&norm) {
            return true;
        }
        let parts: Vec<String> = value
            .split([',', '·'])
            .map(normalize)
            .filter(|p| !p.is_empty())
            .collect();
        parts.len() > 1 && parts.iter().all(|p| self.locations.contains(p))
    }

    /// Any deny-list hit.
    pub fn rejects(&self, value: &str) -> bool {
        self.is_denied_phrase(value) || self.has_boilerplate(value) || self.is_location(value)
    }
}
