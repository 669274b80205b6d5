//! Candidates command - list likely company lines for review.

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;

use jobline_core::candidates::{CandidateScorer, auto_label, extract_candidates};
use jobline_core::posting::rules::ExtractionRules;

use crate::io::{load_config, read_line_records, write_candidates_csv};

/// Arguments for the candidates command.
#[derive(Args)]
pub struct CandidatesArgs {
    /// Line dataset (JSONL or CSV)
    #[arg(required = true)]
    input: PathBuf,

    /// Output CSV (default: company_candidates.csv next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep only the best N candidates
    #[arg(long)]
    limit: Option<usize>,

    /// Relabel candidates scoring at least THRESHOLD as company
    /// (default threshold from config)
    #[arg(long, value_name = "THRESHOLD", num_args = 0..=1)]
    auto_label: Option<Option<i32>>,
}

pub fn run(args: CandidatesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let rules = ExtractionRules::compile(&config.extraction)?;
    let scorer = CandidateScorer::new(&rules, config.candidates.clone());

    let parsed = read_line_records(&args.input)?;
    let mut candidates = extract_candidates(&parsed.items, &scorer, args.limit);

    let threshold = args
        .auto_label
        .map(|t| t.unwrap_or(config.candidates.auto_label_threshold));
    let relabeled = threshold.map(|t| auto_label(&mut candidates, t));

    let output = args.output.unwrap_or_else(|| {
        args.input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
            .join("company_candidates.csv")
    });
    write_candidates_csv(&output, &candidates, threshold.is_some())?;

    println!(
        "{} Wrote {} candidates from {} lines to {}",
        style("✓").green(),
        candidates.len(),
        parsed.items.len(),
        output.display()
    );
    if let (Some(threshold), Some(relabeled)) = (threshold, relabeled) {
        println!(
            "   {} lines relabeled as company (score >= {})",
            relabeled, threshold
        );
    }
    if parsed.skipped > 0 {
        println!("{} Skipped {} malformed records", style("⚠").yellow(), parsed.skipped);
    }

    Ok(())
}
