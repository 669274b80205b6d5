//! Extraction statistics and per-posting quality scores.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

use crate::models::posting::Field;
use crate::posting::{DateSource, ExtractionResult};

/// Run-level counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionStats {
    /// Postings handed to the extractor.
    pub processed: usize,
    /// Postings with a role or a company.
    pub successful: usize,
    /// Postings with neither role nor company.
    pub failed: usize,
    pub found: BTreeMap<Field, usize>,
    pub missing: BTreeMap<Field, usize>,
    /// Postings whose date is the processing date.
    pub dates_defaulted: usize,
}

impl ExtractionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: &ExtractionResult) {
        self.processed += 1;
        if result.presence.role || result.presence.company {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
        for (field, found) in result.presence.iter() {
            let counter = if found { &mut self.found } else { &mut self.missing };
            *counter.entry(field).or_insert(0) += 1;
        }
        if result.date_source == DateSource::Processing {
            self.dates_defaulted += 1;
        }
    }

    pub fn missing(&self, field: Field) -> usize {
        self.missing.get(&field).copied().unwrap_or(0)
    }
}

/// Quality score (0-100) of one extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostingQuality {
    pub file_name: String,
    pub score: u32,
    pub notes: Vec<String>,
}

impl PostingQuality {
    /// Role 20, company 20, description over 50 chars 20, requirements 20,
    /// work mode 10, posting date 10.
    pub fn assess(result: &ExtractionResult) -> Self {
        let fields = &result.fields;
        let presence = &result.presence;
        let mut score = 0;
        let mut notes = Vec::new();

        let checks = [
            (presence.role, 20, "role not found"),
            (presence.company, 20, "company not found"),
            (
                presence.description && fields.description.chars().count() > 50,
                20,
                "description missing or too short",
            ),
            (presence.requirements, 20, "requirements not found"),
            (presence.work_mode, 10, "work mode not found"),
            (presence.date, 10, "posting date not found"),
        ];
        for (ok, points, note) in checks {
            if ok {
                score += points;
            } else {
                notes.push(note.to_string());
            }
        }

        Self {
            file_name: fields.record_file_name(),
            score,
            notes,
        }
    }
}

/// Advice for tuning the rules, derived from the run's weak spots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub field: String,
    pub issue: String,
    pub suggestion: String,
}

impl Suggestion {
    fn new(field: &str, issue: String, suggestion: &str) -> Self {
        Self {
            field: field.to_string(),
            issue,
            suggestion: suggestion.to_string(),
        }
    }
}

/// Contents of `extraction_report.json`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionReport {
    pub stats: ExtractionStats,
    pub average_quality: f64,
    pub postings: Vec<PostingQuality>,
    pub suggestions: Vec<Suggestion>,
}

impl ExtractionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: &ExtractionResult) {
        self.stats.record(result);
        self.postings.push(PostingQuality::assess(result));
        let total: u32 = self.postings.iter().map(|p| p.score).sum();
        self.average_quality = f64::from(total) / self.postings.len() as f64;
        self.suggestions = self.suggest();
    }

    fn suggest(&self) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();
        let hints = [
            (Field::Role, "add role keywords or role markers to the extraction config"),
            (Field::Company, "add company markers or suffixes to the extraction config"),
            (Field::WorkMode, "add work-mode synonyms to the extraction config"),
        ];
        for (field, hint) in hints {
            let missing = self.stats.missing(field);
            if missing > 0 {
                suggestions.push(Suggestion::new(
                    field.as_str(),
                    format!("{missing} of {} postings without {field}", self.stats.processed),
                    hint,
                ));
            }
        }

        if self.average_quality < 60.0 {
            suggestions.push(Suggestion::new(
                "general",
                format!("low average quality ({:.1})", self.average_quality),
                "review the input format; postings may need cleaning before extraction",
            ));
        } else if self.average_quality < 80.0 {
            suggestions.push(Suggestion::new(
                "general",
                format!("moderate average quality ({:.1})", self.average_quality),
                "check the lowest-scoring postings for recurring patterns",
            ));
        }
        suggestions
    }

    /// Plain-text summary, written next to the JSON report.
    pub fn render_text(&self) -> String {
        let stats = &self.stats;
        let mut out = String::new();
        let _ = writeln!(out, "EXTRACTION REPORT");
        let _ = writeln!(out, "=================");
        let _ = writeln!(out);
        let _ = writeln!(out, "Processed:        {}", stats.processed);
        let _ = writeln!(out, "Successful:       {}", stats.successful);
        let _ = writeln!(out, "Failed:           {}", stats.failed);
        let _ = writeln!(out, "Dates defaulted:  {}", stats.dates_defaulted);
        let _ = writeln!(out, "Average quality:  {:.1}/100", self.average_quality);

        let _ = writeln!(out);
        let _ = writeln!(out, "Missing fields:");
        for field in Field::ALL {
            let _ = writeln!(out, "  {:<16}{}", field.as_str(), stats.missing(field));
        }

        let weak: Vec<&PostingQuality> = self.postings.iter().filter(|p| p.score < 60).collect();
        if !weak.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Postings scoring below 60:");
            for posting in weak {
                let _ = writeln!(out, "  {:>3}  {}  ({})", posting.score, posting.file_name, posting.notes.join("; "));
            }
        }

        if !self.suggestions.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Suggestions:");
            for s in &self.suggestions {
                let _ = writeln!(out, "  [{}] {}: {}", s.field, s.issue, s.suggestion);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::{HeuristicExtractor, PostingExtractor};
    use chrono::NaiveDate;

    fn extract(text: &str) -> ExtractionResult {
        HeuristicExtractor::default()
            .with_reference_date(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap())
            .extract(text)
    }

    #[test]
    fn test_quality_of_sample_posting() {
        let result = extract("Senior Data Analyst\nAcme Corp · Remote\n\nRequirements:\n- SQL\n- Python\n");
        let quality = PostingQuality::assess(&result);

        assert_eq!(quality.score, 90);
        assert_eq!(quality.notes, vec!["posting date not found"]);
        assert_eq!(quality.file_name, "senior_data_analyst_acme_corp_2025-01-02.json");
    }

    #[test]
    fn test_stats_and_average() {
        let mut report = ExtractionReport::new();
        report.add(&extract("Senior Data Analyst\nAcme Corp · Remote\n\nRequirements:\n- SQL\n- Python\n"));
        report.add(&extract("hello there.\nthis is not a posting."));

        assert_eq!(report.stats.processed, 2);
        assert_eq!(report.stats.successful, 1);
        assert_eq!(report.stats.failed, 1);
        assert_eq!(report.stats.dates_defaulted, 2);
        assert_eq!(report.stats.missing(Field::Role), 1);
        assert_eq!(report.stats.missing(Field::Date), 2);
        assert_eq!(report.postings[1].score, 0);
        assert!((report.average_quality - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_suggestions_follow_missing_fields_and_quality() {
        let mut report = ExtractionReport::new();
        report.add(&extract("Senior Data Analyst\nAcme Corp · Remote\n\nRequirements:\n- SQL\n- Python\n"));
        assert!(report.suggestions.is_empty());

        report.add(&extract("hello there.\nthis is not a posting."));
        let fields: Vec<&str> = report.suggestions.iter().map(|s| s.field.as_str()).collect();
        assert_eq!(fields, vec!["cargo", "empresa", "modalidad", "general"]);
        assert_eq!(report.suggestions[0].issue, "1 of 2 postings without cargo");
        assert!(report.suggestions[3].issue.starts_with("low average quality (45.0)"));
    }

    #[test]
    fn test_render_text() {
        let mut report = ExtractionReport::new();
        report.add(&extract("hello there.\nthis is not a posting."));
        let text = report.render_text();

        assert!(text.starts_with("EXTRACTION REPORT\n"));
        assert!(text.contains("Processed:        1\n"));
        assert!(text.contains("  cargo           1\n"));
        assert!(text.contains("Postings scoring below 60:"));
        assert!(text.contains("[general] low average quality (0.0)"));
    }
}
