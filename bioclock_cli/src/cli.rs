//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "bioclock", version, about = "Dose timeline and tolerance tools")]
pub struct Cli {
    /// Path to config TOML; a missing file means built-in defaults
    #[arg(long, value_name = "FILE", default_value = "etc/bioclock.toml")]
    pub config: PathBuf,

    /// Substance dataset JSON (overrides catalog.path from the config)
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Print results and logs as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Onset and total duration (minutes) for a substance and route
    Resolve {
        #[arg(long)]
        substance: String,
        /// Administration route; defaults to the substance's first dose-table route
        #[arg(long)]
        route: Option<String>,
    },
    /// Phase of a single dose at a point in time
    Phase {
        #[arg(long)]
        substance: String,
        #[arg(long)]
        route: Option<String>,
        /// RFC 3339 dose time, e.g. 2024-05-01T20:00:00Z
        #[arg(long, value_name = "TIME")]
        dose_time: String,
        /// RFC 3339 evaluation time (default: now)
        #[arg(long, value_name = "TIME")]
        now: Option<String>,
    },
    /// Equivalent-effect dose after a previous dose
    Tolerance {
        /// Dose whose effect you want
        #[arg(long)]
        desired: f64,
        /// Days since the last dose (> 0)
        #[arg(long)]
        days: f64,
        /// Previous dose, shown for reference
        #[arg(long)]
        last: Option<f64>,
    },
    /// Active doses (or the whole history) from a dose log JSON file
    Timeline {
        /// JSON array of dose records
        #[arg(long, value_name = "FILE")]
        doses: PathBuf,
        /// Include doses already in the afterglow
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,
        /// Re-render on every tick until Ctrl-C
        #[arg(long, action = ArgAction::SetTrue)]
        watch: bool,
    },
    /// Write the dose history as CSV
    Export {
        #[arg(long, value_name = "FILE")]
        doses: PathBuf,
        /// Output file (default: stdout)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Routes offered for a substance
    Routes {
        #[arg(long)]
        substance: String,
    },
    /// Onset/duration text and experiences link for a substance
    Info {
        #[arg(long)]
        substance: String,
    },
    /// Serve the dose log HTTP API
    Serve {
        /// Socket address (overrides server.bind)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
    /// Load config and catalog and report what was found
    SelfCheck,
}
