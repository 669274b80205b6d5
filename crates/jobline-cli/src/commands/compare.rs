//! Compare command - diff extracted records against corrected ones.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use glob::{Pattern, glob};
use serde_json::{Map, Value};
use tracing::debug;

use jobline_core::records::{FieldDiff, compare_records, is_record};

use crate::io::read_text;

/// Arguments for the compare command.
#[derive(Args)]
pub struct CompareArgs {
    /// Directory of extracted records
    auto_dir: PathBuf,

    /// Directory of corrected records
    manual_dir: PathBuf,

    /// Also write the differences to a CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: CompareArgs) -> anyhow::Result<()> {
    let auto = read_records(&args.auto_dir)?;
    let manual = read_records(&args.manual_dir)?;

    let shared: Vec<&String> = auto.keys().filter(|name| manual.contains_key(*name)).collect();
    if shared.is_empty() {
        anyhow::bail!(
            "No records in common between {} and {}",
            args.auto_dir.display(),
            args.manual_dir.display()
        );
    }

    let mut diffs: Vec<(&str, FieldDiff)> = Vec::new();
    for name in &shared {
        for diff in compare_records(&auto[*name], &manual[*name]) {
            diffs.push((name.as_str(), diff));
        }
    }

    for (name, diff) in &diffs {
        println!("{} {}: {}", style("≠").yellow(), name, diff.field);
        println!("    auto:   {}", diff.auto.as_deref().unwrap_or("(none)"));
        println!("    manual: {}", diff.manual.as_deref().unwrap_or("(none)"));
    }

    let mut differing: Vec<&str> = diffs.iter().map(|(name, _)| *name).collect();
    differing.dedup();

    println!();
    println!(
        "{} {} of {} shared records differ ({} fields)",
        style("ℹ").blue(),
        differing.len(),
        shared.len(),
        diffs.len()
    );
    let only_auto = auto.keys().filter(|name| !manual.contains_key(*name)).count();
    let only_manual = manual.keys().filter(|name| !auto.contains_key(*name)).count();
    if only_auto > 0 {
        println!("   {} records only in {}", only_auto, args.auto_dir.display());
    }
    if only_manual > 0 {
        println!("   {} records only in {}", only_manual, args.manual_dir.display());
    }

    if let Some(path) = &args.output {
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["file", "field", "auto", "manual"])?;
        for (name, diff) in &diffs {
            wtr.write_record([
                *name,
                diff.field.as_str(),
                diff.auto.as_deref().unwrap_or_default(),
                diff.manual.as_deref().unwrap_or_default(),
            ])?;
        }
        wtr.flush()?;
        println!("{} Differences written to {}", style("✓").green(), path.display());
    }

    Ok(())
}

/// Record files of a directory by file name; reports and other JSON are skipped.
fn read_records(dir: &Path) -> anyhow::Result<BTreeMap<String, Map<String, Value>>> {
    if !dir.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }
    let pattern = format!("{}/*.json", Pattern::escape(&dir.display().to_string()));

    let mut records = BTreeMap::new();
    for path in glob(&pattern)?.filter_map(|r| r.ok()) {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        match serde_json::from_str::<Value>(&read_text(&path)?) {
            Ok(Value::Object(record)) if is_record(&record) => {
                records.insert(name, record);
            }
            _ => debug!("{}: not a posting record, skipped", path.display()),
        }
    }
    Ok(records)
}
