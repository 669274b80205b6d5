//! Stats command - label counts and samples of a line dataset.

use std::path::PathBuf;

use clap::Args;
use console::style;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use jobline_core::dataset::label_counts;
use jobline_core::models::line::{Label, LineRecord};

use crate::io::read_line_records;

/// Arguments for the stats command.
#[derive(Args)]
pub struct StatsArgs {
    /// Line dataset (JSONL or CSV)
    #[arg(required = true)]
    input: PathBuf,

    /// Show up to N random lines per label
    #[arg(long, default_value = "0")]
    samples: usize,

    /// RNG seed for the samples
    #[arg(long)]
    seed: Option<u64>,
}

pub fn run(args: StatsArgs) -> anyhow::Result<()> {
    let parsed = read_line_records(&args.input)?;
    let records = parsed.items;
    if records.is_empty() {
        anyhow::bail!("No records in {}", args.input.display());
    }

    let counts = label_counts(&records);
    println!("{} {} lines in {}", style("ℹ").blue(), records.len(), args.input.display());
    for (label, count) in &counts {
        let share = *count as f64 * 100.0 / records.len() as f64;
        println!("   {:<8} {:>7}  {:>5.1}%", label.as_str(), count, share);
    }
    if parsed.skipped > 0 {
        println!("{} Skipped {} malformed records", style("⚠").yellow(), parsed.skipped);
    }

    if args.samples > 0 {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        for label in Label::ALL {
            let lines: Vec<&LineRecord> = records.iter().filter(|r| r.label == label).collect();
            if lines.is_empty() {
                continue;
            }
            println!();
            println!("{}", style(format!("Samples ({}):", label)).bold());
            for record in lines.choose_multiple(&mut rng, args.samples) {
                println!("  - {}", record.line);
            }
        }
    }

    Ok(())
}
