//! Structured posting records: validation of hand-written or corrected
//! records, and field-by-field comparison of two versions of a record.
//!
//! A record is a flat object keyed like [`ExtractedFields`]
//! (`cargo, empresa, fecha, ...`). Record files hold either one JSON object or
//! `---`-separated blocks of `key: value` lines, where `- item` lines build a
//! list and indented lines continue the previous value.
//!
//! [`ExtractedFields`]: crate::models::posting::ExtractedFields

use std::fmt;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::models::posting::Field;
use crate::splitter::is_delimiter;

lazy_static! {
    static ref KEY_VALUE: Regex = Regex::new(r"^([A-Za-z_]\w*):(?:[ \t]+(.*?))?[ \t]*$").unwrap();
}

/// Fields every record must carry with a non-empty value.
pub const REQUIRED_FIELDS: [Field; 5] = [
    Field::Role,
    Field::Company,
    Field::Date,
    Field::Description,
    Field::Requirements,
];

/// Fields compared between an extracted record and its corrected version.
pub const COMPARED_FIELDS: [Field; 3] = [Field::Role, Field::Company, Field::WorkMode];

/// Why a record failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordIssue {
    /// The block is not a record at all.
    Malformed(String),
    Missing(Field),
    Empty(Field),
    /// `fecha` is not `YYYY-MM-DD`.
    InvalidDate(String),
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordIssue::Malformed(reason) => write!(f, "malformed record: {reason}"),
            RecordIssue::Missing(field) => write!(f, "missing field '{field}'"),
            RecordIssue::Empty(field) => write!(f, "empty field '{field}'"),
            RecordIssue::InvalidDate(date) => write!(f, "invalid date '{date}' (expected YYYY-MM-DD)"),
        }
    }
}

/// One record and what is wrong with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordCheck {
    /// 1-based position of the block in its file.
    pub block: usize,
    pub record: Map<String, Value>,
    pub issues: Vec<RecordIssue>,
}

impl RecordCheck {
    pub fn new(block: usize, record: Map<String, Value>) -> Self {
        let issues = validate_record(&record);
        Self { block, record, issues }
    }

    pub fn malformed(block: usize, reason: impl Into<String>) -> Self {
        Self {
            block,
            record: Map::new(),
            issues: vec![RecordIssue::Malformed(reason.into())],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Display text of a field, `None` when absent or blank.
    pub fn text(&self, field: Field) -> Option<String> {
        field_text(&self.record, field)
    }
}

/// Problems with one record, in [`REQUIRED_FIELDS`] order.
pub fn validate_record(record: &Map<String, Value>) -> Vec<RecordIssue> {
    let mut issues = Vec::new();
    for field in REQUIRED_FIELDS {
        match record.get(field.as_str()) {
            None => issues.push(RecordIssue::Missing(field)),
            Some(value) if is_blank(value) => issues.push(RecordIssue::Empty(field)),
            Some(_) => {}
        }
    }
    if let Some(date) = field_text(record, Field::Date) {
        if NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
            issues.push(RecordIssue::InvalidDate(date));
        }
    }
    issues
}

/// Check every `---`-separated block of a records file.
pub fn validate_blocks(text: &str) -> Vec<RecordCheck> {
    let mut blocks = vec![String::new()];
    for line in text.lines() {
        if is_delimiter(line) {
            blocks.push(String::new());
        } else if let Some(block) = blocks.last_mut() {
            block.push_str(line);
            block.push('\n');
        }
    }

    let checks: Vec<RecordCheck> = blocks
        .iter()
        .filter(|block| !block.trim().is_empty())
        .enumerate()
        .map(|(i, block)| match parse_block(block) {
            Ok(record) => RecordCheck::new(i + 1, record),
            Err(reason) => RecordCheck::malformed(i + 1, reason),
        })
        .collect();

    debug!(
        "Checked {} record blocks, {} invalid",
        checks.len(),
        checks.iter().filter(|c| !c.is_valid()).count()
    );
    checks
}

/// Check a file holding one JSON record.
pub fn validate_json_record(text: &str) -> RecordCheck {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(record)) => RecordCheck::new(1, record),
        Ok(_) => RecordCheck::malformed(1, "not a JSON object"),
        Err(e) => RecordCheck::malformed(1, format!("invalid JSON: {e}")),
    }
}

/// Parse one block: a JSON object, or `key: value` lines.
pub fn parse_block(block: &str) -> Result<Map<String, Value>, String> {
    let trimmed = block.trim();
    if trimmed.starts_with('{') {
        return match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(record)) => Ok(record),
            Ok(_) => Err("not a JSON object".to_string()),
            Err(e) => Err(format!("invalid JSON: {e}")),
        };
    }

    let mut record = Map::new();
    let mut current: Option<String> = None;

    for (number, raw) in block.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let indented = raw.starts_with([' ', '\t']);
        if let Some(caps) = KEY_VALUE.captures(raw).filter(|_| !indented) {
            let key = caps[1].to_string();
            let value = caps.get(2).map_or("", |m| m.as_str());
            record.insert(key.clone(), scalar(value));
            current = Some(key);
            continue;
        }

        let Some(key) = current.as_deref() else {
            return Err(format!("line {}: text outside any field", number + 1));
        };
        let slot = record.entry(key).or_insert_with(|| Value::String(String::new()));

        match line.strip_prefix('-') {
            Some(item) => {
                if matches!(slot, Value::String(text) if text.is_empty()) {
                    *slot = Value::Array(Vec::new());
                }
                match slot {
                    Value::Array(items) => items.push(scalar(item)),
                    _ => return Err(format!("line {}: list item after text in '{}'", number + 1, key)),
                }
            }
            None => match slot {
                Value::String(text) => {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(line);
                }
                _ => return Err(format!("line {}: text after list in '{}'", number + 1, key)),
            },
        }
    }

    if record.is_empty() {
        return Err("no 'key: value' lines".to_string());
    }
    Ok(record)
}

/// A field whose value differs between two versions of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiff {
    pub field: Field,
    pub auto: Option<String>,
    pub manual: Option<String>,
}

/// [`COMPARED_FIELDS`] that differ between an extracted and a corrected record.
pub fn compare_records(auto: &Map<String, Value>, manual: &Map<String, Value>) -> Vec<FieldDiff> {
    COMPARED_FIELDS
        .into_iter()
        .filter_map(|field| {
            let auto = field_text(auto, field);
            let manual = field_text(manual, field);
            (auto != manual).then_some(FieldDiff { field, auto, manual })
        })
        .collect()
}

/// Whether an object carries any record key.
pub fn is_record(value: &Map<String, Value>) -> bool {
    Field::ALL.iter().any(|field| value.contains_key(field.as_str()))
}

fn field_text(record: &Map<String, Value>, field: Field) -> Option<String> {
    match record.get(field.as_str())? {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        value if is_blank(value) => None,
        value => Some(value.to_string()),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.iter().all(is_blank),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn scalar(raw: &str) -> Value {
    let raw = raw.trim();
    if matches!(raw, "|" | ">" | "|-" | ">-") {
        return Value::String(String::new());
    }
    let unquoted = ['"', '\'']
        .into_iter()
        .find_map(|q| raw.strip_prefix(q).and_then(|r| r.strip_suffix(q)))
        .unwrap_or(raw);
    Value::String(unquoted.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    const VALID: &str = "cargo: Data Analyst
empresa: \"Acme Corp\"
fecha: 2024-03-05
descripcion: |
  Build dashboards for the sales team.
  Work with SQL daily.
requerimientos:
  - SQL
  - Python
";

    #[test]
    fn test_parse_key_value_block() {
        let record = parse_block(VALID).unwrap();
        assert_eq!(record["cargo"], "Data Analyst");
        assert_eq!(record["empresa"], "Acme Corp");
        assert_eq!(
            record["descripcion"],
            "Build dashboards for the sales team.\nWork with SQL daily."
        );
        assert_eq!(record["requerimientos"], json!(["SQL", "Python"]));
    }

    #[test]
    fn test_parse_rejects_stray_text() {
        assert!(parse_block("just some words").is_err());
        assert!(parse_block("- SQL\ncargo: x").is_err());
        assert!(parse_block("[1, 2]").is_err());
        assert_eq!(parse_block("{\"cargo\": \"x\"}").unwrap()["cargo"], "x");
    }

    #[test]
    fn test_validate_reports_missing_empty_and_bad_date() {
        let record = object(json!({
            "cargo": "Analyst",
            "empresa": "  ",
            "fecha": "05/03/2024",
            "requerimientos": [],
        }));
        assert_eq!(
            validate_record(&record),
            vec![
                RecordIssue::Empty(Field::Company),
                RecordIssue::Missing(Field::Description),
                RecordIssue::Empty(Field::Requirements),
                RecordIssue::InvalidDate("05/03/2024".to_string()),
            ]
        );
        assert!(validate_record(&parse_block(VALID).unwrap()).is_empty());
    }

    #[test]
    fn test_validate_blocks_numbers_non_empty_blocks() {
        let text = format!("---\n{VALID}---\n\n---\ncargo: Engineer\nfecha: 2024-13-01\n");
        let checks = validate_blocks(&text);

        assert_eq!(checks.len(), 2);
        assert!(checks[0].is_valid());
        assert_eq!(checks[1].block, 2);
        assert_eq!(checks[1].text(Field::Role).as_deref(), Some("Engineer"));
        assert!(checks[1].issues.contains(&RecordIssue::InvalidDate("2024-13-01".to_string())));
        assert!(checks[1].issues.contains(&RecordIssue::Missing(Field::Company)));
    }

    #[test]
    fn test_validate_json_record() {
        assert!(!validate_json_record("[]").is_valid());
        assert!(matches!(
            validate_json_record("{oops").issues[0],
            RecordIssue::Malformed(_)
        ));
        let check = validate_json_record(
            r#"{"cargo": "Analyst", "empresa": "Acme", "fecha": "2024-01-02", "modalidad": "",
                "descripcion": "d", "requerimientos": ["SQL"]}"#,
        );
        assert!(check.is_valid());
    }

    #[test]
    fn test_compare_records() {
        let auto = object(json!({"cargo": "Data Analyst", "empresa": "Remote", "modalidad": "remoto"}));
        let manual = object(json!({"cargo": " Data Analyst ", "empresa": "Acme Corp", "modalidad": "remoto"}));

        assert_eq!(
            compare_records(&auto, &manual),
            vec![FieldDiff {
                field: Field::Company,
                auto: Some("Remote".to_string()),
                manual: Some("Acme Corp".to_string()),
            }]
        );

        let empty = object(json!({"cargo": "Data Analyst", "empresa": "", "modalidad": null}));
        let diffs = compare_records(&empty, &manual);
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[0].auto, None);
    }

    #[test]
    fn test_is_record() {
        assert!(is_record(&object(json!({"empresa": "Acme"}))));
        assert!(!is_record(&object(json!({"stats": {}, "postings": []}))));
    }
}
