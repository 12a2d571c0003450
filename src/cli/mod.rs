//! Command-line interface for driving a workflow session from the terminal.

pub mod commands;
pub mod display;
pub mod output;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

/// Adloop - ad creative experimentation loop
#[derive(Parser, Debug)]
#[command(name = "adloop", version, about, long_about = None)]
pub struct Cli {
    /// Emit machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .adloop/config.yaml + .adloop/local.yaml)
    #[arg(long, global = true, value_name = "PATH", env = "ADLOOP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe the backend service once and report its mode
    Health(commands::health::HealthArgs),
    /// Run one experiment round: plan, creatives, edits, results
    Run(commands::run::RunArgs),
    /// Inspect the effective configuration
    Config(commands::config::ConfigArgs),
}

/// Load configuration from `path` or the default project locations.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Report a command failure and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let payload = serde_json::json!({
            "error": err.to_string(),
            "causes": causes,
        });
        eprintln!("{}", serde_json::to_string_pretty(&payload).unwrap_or_default());
    } else {
        eprintln!("{} {err}", style("error:").red().bold());
        for cause in err.chain().skip(1) {
            eprintln!("  {} {cause}", style("caused by:").dim());
        }
    }
    std::process::exit(1)
}
