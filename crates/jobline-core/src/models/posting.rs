//! Structured posting records.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::text::normalize_for_filename;

/// Fields extracted from one posting.
///
/// Serialized with the record keys consumed by review tooling:
/// `cargo, empresa, fecha, modalidad, descripcion, requerimientos`.
/// Missing scalars are written as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    #[serde(rename = "cargo", default, with = "blank_none")]
    pub role: Option<String>,

    #[serde(rename = "empresa", default, with = "blank_none")]
    pub company: Option<String>,

    /// Posting date, or the processing date when none was found.
    #[serde(rename = "fecha")]
    pub date: NaiveDate,

    #[serde(rename = "modalidad", default, with = "blank_none")]
    pub work_mode: Option<WorkMode>,

    #[serde(rename = "descripcion")]
    pub description: String,

    #[serde(rename = "requerimientos", default)]
    pub requirements: Vec<String>,
}

impl ExtractedFields {
    /// Record file name: `{cargo}_{empresa}_{fecha}.json`.
    ///
    /// Distinct postings may map to the same name.
    pub fn record_file_name(&self) -> String {
        let role = self
            .role
            .as_deref()
            .map_or_else(|| "sin_cargo".to_string(), |r| normalize_for_filename(r, 30));
        let company = self
            .company
            .as_deref()
            .map_or_else(|| "sin_empresa".to_string(), |c| normalize_for_filename(c, 30));
        format!("{}_{}_{}.json", role, company, self.date.format("%Y-%m-%d"))
    }
}

/// Canonical work mode, named by its Spanish term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkMode {
    Remoto,
    Hibrido,
    Presencial,
}

impl WorkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkMode::Remoto => "remoto",
            WorkMode::Hibrido => "hibrido",
            WorkMode::Presencial => "presencial",
        }
    }
}

impl fmt::Display for WorkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkMode {
    type Err = String;

    /// Parse a canonical value. Synonym resolution lives in the extractor.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::text::normalize(s).as_str() {
            "remoto" | "remote" => Ok(WorkMode::Remoto),
            "hibrido" | "hybrid" => Ok(WorkMode::Hibrido),
            "presencial" | "onsite" | "on site" => Ok(WorkMode::Presencial),
            other => Err(format!("unknown work mode {other:?}")),
        }
    }
}

impl Serialize for WorkMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for WorkMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Whether each field was found in the posting rather than defaulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPresence {
    pub role: bool,
    pub company: bool,
    pub date: bool,
    pub work_mode: bool,
    pub description: bool,
    pub requirements: bool,
}

impl FieldPresence {
    /// Iterate `(field, found)` pairs in record order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, bool)> {
        [
            (Field::Role, self.role),
            (Field::Company, self.company),
            (Field::Date, self.date),
            (Field::WorkMode, self.work_mode),
            (Field::Description, self.description),
            (Field::Requirements, self.requirements),
        ]
        .into_iter()
    }
}

/// Extracted field names, as they appear in records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "cargo")]
    Role,
    #[serde(rename = "empresa")]
    Company,
    #[serde(rename = "fecha")]
    Date,
    #[serde(rename = "modalidad")]
    WorkMode,
    #[serde(rename = "descripcion")]
    Description,
    #[serde(rename = "requerimientos")]
    Requirements,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Role,
        Field::Company,
        Field::Date,
        Field::WorkMode,
        Field::Description,
        Field::Requirements,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Role => "cargo",
            Field::Company => "empresa",
            Field::Date => "fecha",
            Field::WorkMode => "modalidad",
            Field::Description => "descripcion",
            Field::Requirements => "requerimientos",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serde adapter writing `None` as `""` and reading `""`/`null` as `None`.
mod blank_none {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Display,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}
