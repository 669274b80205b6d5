//! Config command - inspect and edit the configuration file.
//!
//! Every subcommand works on `--config` when given, else on the user
//! configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use console::style;

use jobline_core::models::config::JoblineConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as JSON
    Show {
        /// Print the built-in defaults instead
        #[arg(long)]
        defaults: bool,
    },

    /// Write the default configuration to a file
    Init {
        /// Where to write (default: the active config file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one setting, e.g. "splitter.min_block_chars"
    Get { key: String },

    /// Change one existing setting (value parsed as JSON, else taken as a string)
    Set { key: String, value: String },

    /// Restore one setting to its default
    Reset { key: String },

    /// Print the active config file and whether it exists
    Path,
}

pub fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let target = config_path.map_or_else(default_config_path, PathBuf::from);

    match args.command {
        ConfigCommand::Show { defaults } => {
            let config = if defaults {
                JoblineConfig::default()
            } else {
                if !target.exists() {
                    println!("{} {} does not exist; using defaults", style("ℹ").blue(), target.display());
                }
                load(&target)?
            };
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommand::Init { output, force } => {
            let path = output.unwrap_or(target);
            if path.exists() && !force {
                anyhow::bail!("{} already exists; pass --force to replace it", path.display());
            }
            save(&JoblineConfig::default(), &path)?;
            println!("{} Created configuration file at {}", style("✓").green(), path.display());
        }
        ConfigCommand::Get { key } => {
            let value = load(&target)?.lookup(&key)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        ConfigCommand::Set { key, value } => {
            let value = serde_json::from_str(&value).unwrap_or(serde_json::Value::String(value));
            let config = load(&target)?.with_setting(&key, value.clone())?;
            save(&config, &target)?;
            println!("{} {} = {} in {}", style("✓").green(), key, value, target.display());
        }
        ConfigCommand::Reset { key } => {
            let default = JoblineConfig::default().lookup(&key)?;
            let config = load(&target)?.with_setting(&key, default.clone())?;
            save(&config, &target)?;
            println!("{} {} reset to {}", style("✓").green(), key, default);
        }
        ConfigCommand::Path => {
            let status = if target.exists() {
                style("exists").green()
            } else {
                style("not created (run 'jobline config init')").yellow()
            };
            println!("{} ({})", target.display(), status);
        }
    }

    Ok(())
}

/// User configuration file, `<config dir>/jobline/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jobline")
        .join("config.json")
}

/// The file at `path`, or the defaults when it does not exist yet.
fn load(path: &Path) -> anyhow::Result<JoblineConfig> {
    if !path.exists() {
        return Ok(JoblineConfig::default());
    }
    JoblineConfig::from_file(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

fn save(config: &JoblineConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}
