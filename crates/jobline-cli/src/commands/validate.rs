//! Validate command - check hand-written or corrected posting records.

use std::path::PathBuf;

use clap::Args;
use console::style;
use glob::glob;
use serde_json::{Map, Value};
use tracing::debug;

use jobline_core::models::posting::Field;
use jobline_core::records::{RecordCheck, validate_blocks, validate_json_record};

use crate::io::{read_text, write_jsonl};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Record files or glob pattern: `.json` records, or text files with
    /// `---`-separated `key: value` blocks
    #[arg(required = true)]
    input: String,

    /// Write the valid records to this JSONL file
    #[arg(long)]
    jsonl: Option<PathBuf>,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    let mut valid: Vec<Map<String, Value>> = Vec::new();
    let mut total = 0;
    let mut invalid = 0;

    for path in &files {
        let text = read_text(path)?;
        let checks: Vec<RecordCheck> = if path.extension().is_some_and(|e| e == "json") {
            vec![validate_json_record(&text)]
        } else {
            validate_blocks(&text)
        };
        debug!("{}: {} records", path.display(), checks.len());

        for check in checks {
            total += 1;
            if check.is_valid() {
                valid.push(check.record);
                continue;
            }
            invalid += 1;
            let issues: Vec<String> = check.issues.iter().map(ToString::to_string).collect();
            println!(
                "{} {} block {}: {}",
                style("✗").red(),
                path.display(),
                check.block,
                issues.join("; ")
            );
            println!(
                "    cargo: {}  empresa: {}",
                check.text(Field::Role).unwrap_or_else(|| "-".to_string()),
                check.text(Field::Company).unwrap_or_else(|| "-".to_string())
            );
        }
    }

    println!();
    println!(
        "{} {} records in {} files: {} valid, {} invalid",
        style("ℹ").blue(),
        total,
        files.len(),
        valid.len(),
        invalid
    );

    if let Some(path) = &args.jsonl {
        write_jsonl(path, &valid)?;
        println!("{} {} valid records written to {}", style("✓").green(), valid.len(), path.display());
    }

    if invalid > 0 {
        anyhow::bail!("{} of {} records failed validation", invalid, total);
    }
    println!("{} All records are valid", style("✓").green());
    Ok(())
}
