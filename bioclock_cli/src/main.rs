#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

mod cli;
mod commands;
mod error_fmt;
mod server;

use bioclock_core::BioclockError;
use clap::Parser;
use cli::{Cli, FILE_GUARD, JSON_MODE};
use eyre::Result;
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if !cli.json {
        // Only affects panics and debug reports; our own errors go through humanize()
        let _ = color_eyre::install();
    }

    if let Err(err) = run(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("{}", error_fmt::humanize(&err));
            tracing::debug!("{err:?}");
        }
        std::process::exit(error_fmt::exit_code_for_error(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut cfg = load_config(&cli.config)?;
    if let Some(catalog) = cli.catalog {
        cfg.catalog.path = Some(catalog);
    }
    init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "starting");
    commands::run(cli.cmd, &cfg, cli.json)
}

/// A missing file means defaults; a present but broken one is an error.
fn load_config(path: &Path) -> Result<bioclock_config::Config> {
    if !path.exists() {
        return Ok(bioclock_config::Config::default());
    }
    bioclock_config::load_file(path).map_err(|e| BioclockError::Config(format!("{e}")).into())
}

fn init_tracing(json: bool, console_level: &str, logging: &bioclock_config::Logging) -> Result<()> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(console_level));
    let mut layers: Vec<BoxedLayer> = Vec::new();
    layers.push(if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter)
            .boxed()
    });

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map_or_else(|| "bioclock.log".into(), |n| n.to_string_lossy().into_owned());
        let appender = match logging.rotation.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let level = logging.level.as_deref().unwrap_or("info");
        layers.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::new(level))
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| eyre::eyre!("init logging: {e}"))
}
