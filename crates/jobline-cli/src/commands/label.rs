//! Label command - build the line-level dataset from training pairs.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;

use jobline_core::dataset::{LabelingOutput, TrainingPair, label_pairs};

use crate::io::{load_config, read_jsonl, write_jsonl, write_lines_csv};

/// Arguments for the label command.
#[derive(Args)]
pub struct LabelArgs {
    /// Training pairs (JSONL)
    #[arg(required = true)]
    input: PathBuf,

    /// Output directory (default: next to the input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

pub fn run(args: LabelArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let parsed = read_jsonl::<TrainingPair>(&args.input)?;
    let output = label_pairs(&parsed.items, &config.labeling);
    if output.records.is_empty() {
        anyhow::bail!("No lines labeled from {}", args.input.display());
    }

    let output_dir = args
        .output_dir
        .unwrap_or_else(|| args.input.parent().map(Path::to_path_buf).unwrap_or_default());
    write_dataset(&output_dir, &output)?;

    println!(
        "{} Labeled {} lines from {} postings",
        style("✓").green(),
        output.records.len(),
        output.postings
    );
    let counts: Vec<String> = output
        .counts
        .iter()
        .map(|(label, count)| format!("{} {}", label, count))
        .collect();
    println!("   {}", counts.join(", "));
    println!("   {} lines to review", output.review.len());
    if output.skipped > 0 || parsed.skipped > 0 {
        println!(
            "{} Skipped {} blank pairs and {} malformed records",
            style("⚠").yellow(),
            output.skipped,
            parsed.skipped
        );
    }

    Ok(())
}

/// Write `line_dataset.jsonl`, `line_dataset.csv` and `line_dataset_review.jsonl`.
pub fn write_dataset(dir: &Path, output: &LabelingOutput) -> anyhow::Result<()> {
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)?;
    }
    write_jsonl(&dir.join("line_dataset.jsonl"), &output.records)?;
    write_lines_csv(&dir.join("line_dataset.csv"), &output.records)?;
    write_jsonl(&dir.join("line_dataset_review.jsonl"), &output.review)?;
    Ok(())
}
