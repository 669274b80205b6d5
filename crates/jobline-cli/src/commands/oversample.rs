//! Oversample command - duplicate minority-label lines into a new file.

use std::path::PathBuf;

use clap::Args;
use console::style;
use rand::SeedableRng;
use rand::rngs::StdRng;

use jobline_core::dataset::oversample;
use jobline_core::models::line::Label;

use crate::io::{load_config, read_line_records, same_file, write_jsonl};

use super::dedupe::sibling;

/// Arguments for the oversample command.
#[derive(Args)]
pub struct OversampleArgs {
    /// Line dataset (JSONL)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: <stem>.oversampled.jsonl)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Label to oversample (role, company or other)
    #[arg(long)]
    label: Option<Label>,

    /// Share of the output the label should reach, in (0, 1)
    #[arg(long)]
    target_ratio: Option<f64>,

    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

pub fn run(args: OversampleArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let label = args.label.unwrap_or(config.oversample.label);
    let ratio = args.target_ratio.unwrap_or(config.oversample.target_ratio);

    let output = args.output.unwrap_or_else(|| sibling(&args.input, "oversampled"));
    if same_file(&output, &args.input) {
        anyhow::bail!(
            "Refusing to overwrite the input dataset {}; choose another --output",
            args.input.display()
        );
    }

    let parsed = read_line_records(&args.input)?;
    if parsed.items.is_empty() {
        anyhow::bail!("No records in {}", args.input.display());
    }

    let mut rng = match args.seed.or(config.oversample.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let outcome = oversample(parsed.items, label, ratio, &mut rng)?;
    write_jsonl(&output, &outcome.records)?;

    println!(
        "{} Added {} '{}' duplicates; wrote {} records to {}",
        style("✓").green(),
        outcome.added,
        label,
        outcome.records.len(),
        output.display()
    );
    for (label, before) in &outcome.before {
        let after = outcome.after.get(label).copied().unwrap_or(0);
        println!("   {:<8} {:>7} -> {}", label.as_str(), before, after);
    }

    Ok(())
}
