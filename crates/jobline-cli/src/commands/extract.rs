//! Extract command - structured records from posting text files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};

use jobline_core::dataset::{TrainingPair, label_pairs};
use jobline_core::models::posting::ExtractedFields;
use jobline_core::posting::{HeuristicExtractor, PostingExtractor};
use jobline_core::report::ExtractionReport;
use jobline_core::splitter::split;

use crate::io::{load_config, read_text, write_jsonl};

use super::label::write_dataset;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Directory for per-posting record files
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Training pairs file (default: <output-dir>/training_data.jsonl)
    #[arg(long)]
    pairs: Option<PathBuf>,

    /// Also label the postings into a line dataset in this directory
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Write extraction_report.json and extraction_report.txt to the output directory
    #[arg(long)]
    report: bool,

    /// Continue when an input file cannot be read
    #[arg(long)]
    continue_on_error: bool,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let extractor = HeuristicExtractor::from_config(&config.extraction)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!("{} Found {} files to process", style("ℹ").blue(), files.len());

    fs::create_dir_all(&args.output_dir)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut report = ExtractionReport::new();
    let mut pairs = Vec::new();
    let mut written = HashSet::new();
    let mut unreadable = Vec::new();

    for path in &files {
        let text = match read_text(path) {
            Ok(text) => text,
            Err(e) if args.continue_on_error => {
                warn!("Failed to read {}: {:#}", path.display(), e);
                unreadable.push((path.clone(), format!("{:#}", e)));
                pb.inc(1);
                continue;
            }
            Err(e) => {
                error!("Failed to read {}: {:#}", path.display(), e);
                return Err(e);
            }
        };

        let postings = split(&text, &config.splitter);
        debug!("{}: {} postings", path.display(), postings.len());

        for posting in postings {
            let result = extractor.extract(&posting.text);
            report.add(&result);

            let record_path = unique_record_path(&args.output_dir, &result.fields, &mut written);
            fs::write(&record_path, serde_json::to_string_pretty(&result.fields)?)?;
            debug!("Wrote record to {}", record_path.display());

            pairs.push(TrainingPair::from_extraction(posting.text, result.fields));
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if pairs.is_empty() {
        anyhow::bail!("No postings extracted from {} files", files.len());
    }

    let pairs_path = args
        .pairs
        .clone()
        .unwrap_or_else(|| args.output_dir.join("training_data.jsonl"));
    write_jsonl(&pairs_path, &pairs)?;
    println!(
        "{} Wrote {} training pairs to {}",
        style("✓").green(),
        pairs.len(),
        pairs_path.display()
    );

    if let Some(dataset_dir) = &args.dataset {
        let labeled = label_pairs(&pairs, &config.labeling);
        write_dataset(dataset_dir, &labeled)?;
        println!(
            "{} Wrote {} labeled lines to {}",
            style("✓").green(),
            labeled.records.len(),
            dataset_dir.display()
        );
    }

    if args.report {
        let report_path = args.output_dir.join("extraction_report.json");
        fs::write(&report_path, serde_json::to_string_pretty(&report)?)?;
        fs::write(args.output_dir.join("extraction_report.txt"), report.render_text())?;
        println!("{} Report written to {}", style("✓").green(), report_path.display());
    }

    print_summary(&report, start, &unreadable);
    info!("Extraction finished in {:?}", start.elapsed());

    Ok(())
}

/// Record path for `fields`, suffixed `_2`, `_3`, ... when the name is taken.
fn unique_record_path(dir: &Path, fields: &ExtractedFields, written: &mut HashSet<String>) -> PathBuf {
    let name = fields.record_file_name();
    let mut candidate = name.clone();
    let mut n = 1;
    while written.contains(&candidate) {
        n += 1;
        let stem = name.trim_end_matches(".json");
        candidate = format!("{}_{}.json", stem, n);
    }
    if n > 1 {
        warn!("Record name {} already used; writing {}", name, candidate);
    }
    written.insert(candidate.clone());
    dir.join(candidate)
}

fn print_summary(report: &ExtractionReport, start: Instant, unreadable: &[(PathBuf, String)]) {
    let stats = &report.stats;

    println!();
    println!(
        "{} Processed {} postings in {:?}",
        style("✓").green(),
        stats.processed,
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(stats.successful).green(),
        style(stats.failed).red()
    );
    println!("   average quality {:.1}", report.average_quality);

    let missing: Vec<String> = stats
        .missing
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(field, count)| format!("{} {}", field, count))
        .collect();
    if !missing.is_empty() {
        println!("{} Fields not found: {}", style("⚠").yellow(), missing.join(", "));
    }
    if stats.dates_defaulted > 0 {
        println!(
            "{} {} postings had no date; used the processing date",
            style("⚠").yellow(),
            stats.dates_defaulted
        );
    }

    if !unreadable.is_empty() {
        println!();
        println!("{}", style("Unreadable files:").red());
        for (path, reason) in unreadable {
            println!("  {} {}: {}", style("✗").red(), path.display(), reason);
        }
    }
}
