//! Dedupe command - drop duplicate dataset lines or training pairs.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;

use jobline_core::dataset::{TrainingPair, dedupe, dedupe_pairs};

use crate::io::{read_jsonl, read_line_records, same_file, write_jsonl};

/// Arguments for the dedupe command.
#[derive(Args)]
pub struct DedupeArgs {
    /// Line dataset or training pairs (JSONL)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: <stem>.dedup.jsonl)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input holds training pairs instead of dataset lines
    #[arg(long)]
    pairs: bool,

    /// Write conflicting pair annotations to this file
    #[arg(long, requires = "pairs")]
    conflicts: Option<PathBuf>,
}

pub fn run(args: DedupeArgs) -> anyhow::Result<()> {
    let output = args.output.clone().unwrap_or_else(|| sibling(&args.input, "dedup"));
    if same_file(&output, &args.input) {
        anyhow::bail!("Refusing to overwrite the input file {}", args.input.display());
    }

    if args.pairs {
        dedupe_training_pairs(&args, &output)
    } else {
        dedupe_lines(&args.input, &output)
    }
}

fn dedupe_lines(input: &Path, output: &Path) -> anyhow::Result<()> {
    let parsed = read_line_records(input)?;
    let (records, report) = dedupe(parsed.items);
    if records.is_empty() {
        anyhow::bail!("No records in {}", input.display());
    }
    write_jsonl(output, &records)?;

    println!(
        "{} Wrote {} of {} lines to {} ({} duplicates removed)",
        style("✓").green(),
        report.output,
        report.input,
        output.display(),
        report.removed
    );
    Ok(())
}

fn dedupe_training_pairs(args: &DedupeArgs, output: &Path) -> anyhow::Result<()> {
    let parsed = read_jsonl::<TrainingPair>(&args.input)?;
    let input_count = parsed.items.len();
    let result = dedupe_pairs(parsed.items);
    if result.pairs.is_empty() {
        anyhow::bail!("No training pairs in {}", args.input.display());
    }
    write_jsonl(output, &result.pairs)?;

    println!(
        "{} Wrote {} of {} pairs to {} ({} duplicates removed)",
        style("✓").green(),
        result.pairs.len(),
        input_count,
        output.display(),
        result.removed
    );

    if !result.conflicts.is_empty() {
        println!(
            "{} {} postings have conflicting annotations:",
            style("⚠").yellow(),
            result.conflicts.len()
        );
        for conflict in &result.conflicts {
            println!("  - {} ({} other versions)", conflict.source_hash, conflict.others.len());
        }
        if let Some(path) = &args.conflicts {
            write_jsonl(path, &result.conflicts)?;
            println!("{} Conflicts written to {}", style("✓").green(), path.display());
        }
    }
    Ok(())
}

/// `dir/<stem>.<tag>.jsonl` next to `input`.
pub fn sibling(input: &Path, tag: &str) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("dataset");
    input.with_file_name(format!("{}.{}.jsonl", stem, tag))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_name() {
        assert_eq!(
            sibling(Path::new("data/line_dataset.jsonl"), "oversampled"),
            PathBuf::from("data/line_dataset.oversampled.jsonl")
        );
        assert_eq!(sibling(Path::new("pairs"), "dedup"), PathBuf::from("pairs.dedup.jsonl"));
    }
}
