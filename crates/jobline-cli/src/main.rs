//! CLI application for job-posting extraction and line-label datasets.

mod commands;
mod io;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{
    audit, candidates, compare, config, dedupe, extract, label, merge, oversample, stats, validate,
};

/// Job posting extraction - Structured records and line-level training data
#[derive(Parser)]
#[command(name = "jobline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract structured records from posting text files
    Extract(extract::ExtractArgs),

    /// Build a line-level dataset from training pairs
    Label(label::LabelArgs),

    /// Apply corrected labels on top of a line dataset
    Merge(merge::MergeArgs),

    /// Remove duplicate lines or training pairs
    Dedupe(dedupe::DedupeArgs),

    /// Duplicate minority-label lines up to a target ratio
    Oversample(oversample::OversampleArgs),

    /// List likely company lines for review
    Candidates(candidates::CandidatesArgs),

    /// List suspicious extractions in training pairs
    Audit(audit::AuditArgs),

    /// Show label counts of a line dataset
    Stats(stats::StatsArgs),

    /// Check hand-written or corrected posting records
    Validate(validate::ValidateArgs),

    /// Diff extracted records against corrected ones
    Compare(compare::CompareArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Extract(args) => extract::run(args, config_path),
        Commands::Label(args) => label::run(args, config_path),
        Commands::Merge(args) => merge::run(args),
        Commands::Dedupe(args) => dedupe::run(args),
        Commands::Oversample(args) => oversample::run(args, config_path),
        Commands::Candidates(args) => candidates::run(args, config_path),
        Commands::Audit(args) => audit::run(args, config_path),
        Commands::Stats(args) => stats::run(args),
        Commands::Validate(args) => validate::run(args),
        Commands::Compare(args) => compare::run(args),
        Commands::Config(args) => config::run(args, config_path),
    }
}
