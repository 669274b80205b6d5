//! Merge command - apply corrected labels on top of a line dataset.

use std::path::PathBuf;

use clap::Args;
use console::style;

use jobline_core::dataset::merge;

use crate::io::{read_line_records, write_jsonl};

/// Arguments for the merge command.
#[derive(Args)]
pub struct MergeArgs {
    /// Base line dataset (JSONL)
    #[arg(required = true)]
    base: PathBuf,

    /// Corrections (JSONL, or CSV with line,label,source_hash)
    #[arg(required = true)]
    overlay: PathBuf,

    /// Output file (default: line_dataset.merged.jsonl next to the base)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: MergeArgs) -> anyhow::Result<()> {
    let base = read_line_records(&args.base)?;
    let overlay = read_line_records(&args.overlay)?;

    let outcome = merge(base.items, overlay.items);
    if outcome.records.is_empty() {
        anyhow::bail!("Merged dataset is empty");
    }

    let output = args
        .output
        .unwrap_or_else(|| args.base.with_file_name("line_dataset.merged.jsonl"));
    write_jsonl(&output, &outcome.records)?;

    let report = outcome.report;
    println!(
        "{} Merged into {}: updated={} added={} total={}",
        style("✓").green(),
        output.display(),
        report.updated,
        report.added,
        report.total
    );
    let skipped = base.skipped + overlay.skipped;
    if skipped > 0 {
        println!("{} Skipped {} malformed records", style("⚠").yellow(), skipped);
    }

    Ok(())
}
