//! Audit command - list training pairs with a suspicious company value.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;
use console::style;

use jobline_core::dataset::{AuditIssue, TrainingPair, audit_pair};
use jobline_core::posting::rules::ExtractionRules;

use crate::io::{load_config, read_jsonl};

/// Arguments for the audit command.
#[derive(Args)]
pub struct AuditArgs {
    /// Training pairs (JSONL)
    #[arg(required = true)]
    input: PathBuf,

    /// Also write the findings to a CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

struct Finding {
    index: usize,
    source_hash: String,
    issue: AuditIssue,
    role: String,
    company: String,
}

pub fn run(args: AuditArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let rules = ExtractionRules::compile(&config.extraction)?;

    let parsed = read_jsonl::<TrainingPair>(&args.input)?;
    if parsed.items.is_empty() {
        anyhow::bail!("No training pairs in {}", args.input.display());
    }

    let findings: Vec<Finding> = parsed
        .items
        .iter()
        .enumerate()
        .filter_map(|(index, pair)| {
            let issue = audit_pair(pair, &rules)?;
            let targets = pair.targets();
            Some(Finding {
                index,
                source_hash: pair.identity(),
                issue,
                role: targets.role.unwrap_or_default(),
                company: targets.company.unwrap_or_default(),
            })
        })
        .collect();

    for finding in &findings {
        println!(
            "{:>5}  {:<20}  {:?} / {:?}",
            finding.index,
            style(finding.issue.as_str()).yellow(),
            finding.role,
            finding.company
        );
    }

    let mut by_issue: BTreeMap<&'static str, usize> = BTreeMap::new();
    for finding in &findings {
        *by_issue.entry(finding.issue.as_str()).or_insert(0) += 1;
    }

    println!();
    if findings.is_empty() {
        println!("{} No suspicious extractions in {} pairs", style("✓").green(), parsed.items.len());
    } else {
        let summary: Vec<String> = by_issue.iter().map(|(k, v)| format!("{} {}", k, v)).collect();
        println!(
            "{} {} of {} pairs flagged: {}",
            style("⚠").yellow(),
            findings.len(),
            parsed.items.len(),
            summary.join(", ")
        );
    }

    if let Some(path) = &args.output {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["source_index", "source_hash", "issue", "cargo", "empresa"])?;
        for finding in &findings {
            wtr.write_record([
                finding.index.to_string().as_str(),
                finding.source_hash.as_str(),
                finding.issue.as_str(),
                finding.role.as_str(),
                finding.company.as_str(),
            ])?;
        }
        wtr.flush()?;
        println!("{} Findings written to {}", style("✓").green(), path.display());
    }

    Ok(())
}
