//! Command-line interface

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::settings::ReportFormat;

/// Runs the REST smoke test once and prints a report.
#[derive(Parser, Debug)]
#[command(
    name = "pulse",
    version,
    about = "Runs a fixed REST smoke test and reports every check"
)]
pub struct Cli {
    /// Path to a TOML configuration file (default: ./pulse.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the API under test
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds (default: none)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Post id used when the create call returns none
    #[arg(long)]
    pub fallback_id: Option<u64>,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default log filter for the selected verbosity.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
