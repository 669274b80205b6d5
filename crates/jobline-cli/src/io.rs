//! File formats shared by the commands: posting text, JSONL and CSV datasets.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use jobline_core::candidates::CandidateRecord;
use jobline_core::models::config::JoblineConfig;
use jobline_core::models::line::{Label, LineRecord};
use jobline_core::text::{TextEncoding, decode_text};

use crate::commands::config::default_config_path;

/// Load `--config`, else the user config file if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<JoblineConfig> {
    if let Some(path) = config_path {
        return JoblineConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path));
    }

    let user_config = default_config_path();
    if user_config.exists() {
        debug!("Using config file {}", user_config.display());
        return JoblineConfig::from_file(&user_config)
            .with_context(|| format!("Failed to load config from {}", user_config.display()));
    }

    Ok(JoblineConfig::default())
}

/// Read a posting text file, whatever its encoding.
pub fn read_text(path: &Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let decoded = decode_text(&bytes);
    match decoded.encoding {
        TextEncoding::Utf8 | TextEncoding::Utf8Bom => {}
        TextEncoding::Latin1 => warn!("{} is not UTF-8; decoded as Latin-1", path.display()),
        TextEncoding::Lossy => warn!(
            "{} is not valid text; undecodable bytes were replaced",
            path.display()
        ),
    }
    Ok(decoded.text)
}

/// Whether two paths name the same file, however they are spelled.
pub fn same_file(a: &Path, b: &Path) -> bool {
    a == b || matches!((fs::canonicalize(a), fs::canonicalize(b)), (Ok(a), Ok(b)) if a == b)
}

/// Records read from a file, plus the number of rows skipped as malformed.
pub struct Parsed<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

/// Read one JSON value per line; malformed lines are skipped with a warning.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Parsed<T>> {
    let content = read_text(path)?;
    let mut items = Vec::new();
    let mut skipped = 0;

    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(item) => items.push(item),
            Err(e) => {
                warn!("{}:{}: skipping malformed record: {}", path.display(), number + 1, e);
                skipped += 1;
            }
        }
    }

    Ok(Parsed { items, skipped })
}

pub fn write_jsonl<T: Serialize>(path: &Path, items: &[T]) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for item in items {
        serde_json::to_writer(&mut writer, item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a line dataset from JSONL, or from CSV when the extension is `.csv`.
pub fn read_line_records(path: &Path) -> anyhow::Result<Parsed<LineRecord>> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let mut parsed = if is_csv {
        read_lines_csv(path)?
    } else {
        read_jsonl::<LineRecord>(path)?
    };

    // Hand-edited JSONL may omit or stale the normalized column.
    for record in &mut parsed.items {
        record.line_norm = jobline_core::normalize(&record.line);
    }
    Ok(parsed)
}

/// Read a `line,label,source_hash` CSV; a blank label reads as `other`.
fn read_lines_csv(path: &Path) -> anyhow::Result<Parsed<LineRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
    let line_col = column("line").with_context(|| format!("{} has no 'line' column", path.display()))?;
    let label_col = column("label");
    let hash_col = column("source_hash");

    let mut items = Vec::new();
    let mut skipped = 0;
    for (number, row) in reader.records().enumerate() {
        // Header is row 1.
        let row_number = number + 2;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("{}:{}: skipping unreadable row: {}", path.display(), row_number, e);
                skipped += 1;
                continue;
            }
        };
        let Some(line) = row.get(line_col) else {
            warn!("{}:{}: skipping row without a line", path.display(), row_number);
            skipped += 1;
            continue;
        };

        let raw_label = label_col.and_then(|c| row.get(c)).unwrap_or("").trim();
        let label = if raw_label.is_empty() {
            Label::Other
        } else {
            match raw_label.parse::<Label>() {
                Ok(label) => label,
                Err(e) => {
                    warn!("{}:{}: skipping row: {}", path.display(), row_number, e);
                    skipped += 1;
                    continue;
                }
            }
        };
        let source_hash = hash_col.and_then(|c| row.get(c)).unwrap_or("").trim();
        items.push(LineRecord::new(line, label, source_hash));
    }

    Ok(Parsed { items, skipped })
}

/// Write the `line,label,source_hash` review CSV.
pub fn write_lines_csv(path: &Path, records: &[LineRecord]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["line", "label", "source_hash"])?;
    for record in records {
        wtr.write_record([record.line.as_str(), record.label.as_str(), record.source_hash.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the candidate CSV; `audit_columns` adds `orig_label,auto_labeled`.
pub fn write_candidates_csv(
    path: &Path,
    candidates: &[CandidateRecord],
    audit_columns: bool,
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec![
        "line",
        "label",
        "source_hash",
        "source_index",
        "line_index",
        "reason",
        "score",
    ];
    if audit_columns {
        header.extend(["orig_label", "auto_labeled"]);
    }
    wtr.write_record(&header)?;

    let position = |p: Option<usize>| p.map(|v| v.to_string()).unwrap_or_default();
    for candidate in candidates {
        let mut row = vec![
            candidate.line.clone(),
            candidate.label.to_string(),
            candidate.source_hash.clone(),
            position(candidate.source_index),
            position(candidate.line_index),
            candidate.reason.clone(),
            candidate.score.to_string(),
        ];
        if audit_columns {
            row.push(candidate.orig_label.map(|l| l.to_string()).unwrap_or_default());
            let auto = match candidate.auto_labeled {
                Some(true) => "yes",
                Some(false) => "no",
                None => "",
            };
            row.push(auto.to_string());
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_file_through_dot_segments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.jsonl");
        fs::write(&path, "").unwrap();

        assert!(same_file(&path, &dir.path().join(".").join("lines.jsonl")));
        assert!(!same_file(&path, &dir.path().join("other.jsonl")));
    }

    #[test]
    fn test_jsonl_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.jsonl");
        fs::write(
            &path,
            "{\"line\": \"Acme\", \"label\": \"company\", \"source_hash\": \"h\"}\n\
             not json\n\
             \n\
             {\"line\": \"x\", \"label\": \"skill\"}\n",
        )
        .unwrap();

        let parsed = read_line_records(&path).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].line_norm, "acme");
        assert_eq!(parsed.skipped, 2);
    }

    #[test]
    fn test_csv_blank_label_is_other() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.csv");
        fs::write(&path, "line,label,source_hash\nAcme Corp,company,h\nSQL,,h\nFoo,skill,h\n").unwrap();

        let parsed = read_line_records(&path).unwrap();
        let labels: Vec<Label> = parsed.items.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec![Label::Company, Label::Other]);
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_lines_csv_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.csv");
        let records = vec![LineRecord::new("Acme, Inc", Label::Company, "h")];
        write_lines_csv(&path, &records).unwrap();

        let parsed = read_line_records(&path).unwrap();
        assert_eq!(parsed.items, records);
    }
}
