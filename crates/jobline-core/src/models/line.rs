//! Line-level training records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Weak-supervision label of a single posting line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Role,
    Company,
    Other,
}

impl Label {
    pub const ALL: [Label; 3] = [Label::Role, Label::Company, Label::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Role => "role",
            Label::Company => "company",
            Label::Other => "other",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for label tokens outside `{role, company, other}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown label {:?} (expected role, company or other)", self.0)
    }
}

impl std::error::Error for UnknownLabel {}

impl FromStr for Label {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "role" => Ok(Label::Role),
            "company" => Ok(Label::Company),
            "other" => Ok(Label::Other),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

/// One line of a posting with its label and provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    /// Original line text.
    pub line: String,

    /// Normalized form of `line`.
    #[serde(default)]
    pub line_norm: String,

    pub label: Label,

    /// Content hash of the parent posting text.
    #[serde(default)]
    pub source_hash: String,

    /// Position of the parent posting in its input.
    #[serde(default)]
    pub source_index: Option<usize>,

    /// Position of the line among the posting's non-empty lines.
    #[serde(default)]
    pub line_index: Option<usize>,
}

impl LineRecord {
    pub fn new(line: impl Into<String>, label: Label, source_hash: impl Into<String>) -> Self {
        let line = line.into();
        Self {
            line_norm: crate::text::normalize(&line),
            line,
            label,
            source_hash: source_hash.into(),
            source_index: None,
            line_index: None,
        }
    }

    pub fn with_position(mut self, source_index: usize, line_index: usize) -> Self {
        self.source_index = Some(source_index);
        self.line_index = Some(line_index);
        self
    }
}
