//! `valmap-cli` – spatial value-field evaluator.
//!
//! This binary:
//!
//! 1. Loads `~/.valmap/config.toml` (or `--config PATH`), falling back to the
//!    built-in defaults when the file is absent.
//! 2. Builds the distance table – a truncated normal, or a pairwise table from
//!    the `[pairwise]` section.  Configuration errors stop here, before any
//!    grid evaluation.
//! 3. Evaluates the value field for the configured objects (or `--objects`
//!    JSON file).
//! 4. Prints a summary, or emits `{xs, ys, field}` JSON on stdout for an
//!    external renderer.

mod config;
mod inputs;
mod output;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use tracing::{info, warn};

use valmap_core::{DistanceTable, GridEvaluator, SpatialGrid, ValueField, ValueSource};
use valmap_types::ReferenceObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "valmap", version, about = "Evaluate a distance-based value field over a 2-D grid")]
struct Cli {
    /// Configuration file (default: ~/.valmap/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of reference objects; overrides the config's objects.
    #[arg(long)]
    objects: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Compute per-object fields on all cores.
    #[arg(long)]
    parallel: bool,

    /// Write the default configuration to the config path and exit.
    #[arg(long)]
    init: bool,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(config::config_path);

    if cli.init {
        if config_path.exists() {
            warn!(path = %config_path.display(), "config already exists; leaving it untouched");
            return Ok(());
        }
        config::save_to(&config::Config::default(), &config_path)?;
        println!(
            "  {} Config saved to {}",
            "✓".green().bold(),
            config_path.display().to_string().bold()
        );
        return Ok(());
    }

    let cfg = match config::load_from(&config_path)? {
        Some(cfg) => {
            info!(path = %config_path.display(), "config loaded");
            cfg
        }
        None => {
            info!(path = %config_path.display(), "no config file; using defaults");
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    };

    let objects = match &cli.objects {
        Some(path) => inputs::load_objects(path)?,
        None => cfg.objects.clone(),
    };
    let grid = SpatialGrid::symmetric(&cfg.grid).context("invalid [grid] configuration")?;

    let field = match &cfg.pairwise {
        Some(section) => {
            let pairwise = inputs::load_pairwise(section, &cfg.table)?;
            match section.subject {
                Some(subject) => {
                    let view = pairwise
                        .for_subject(subject)
                        .context("invalid [pairwise] subject")?;
                    run(&GridEvaluator::new(view, grid.clone()), &objects, cli.parallel)
                }
                None => run(
                    &GridEvaluator::new(pairwise.collapsed(), grid.clone()),
                    &objects,
                    cli.parallel,
                ),
            }
        }
        None => {
            let table = DistanceTable::truncated_normal(&cfg.table)
                .context("invalid [table] configuration")?;
            run(&GridEvaluator::new(table, grid.clone()), &objects, cli.parallel)
        }
    };

    match cli.format {
        OutputFormat::Json => println!("{}", output::to_json(&grid, &field)?),
        OutputFormat::Summary => output::print_summary(&grid, &field, objects.len()),
    }
    Ok(())
}

fn run<S: ValueSource + Sync>(
    evaluator: &GridEvaluator<S>,
    objects: &[ReferenceObject],
    parallel: bool,
) -> ValueField {
    if objects.is_empty() {
        warn!("no reference objects; the field will be all zeros");
    }
    if parallel {
        evaluator.evaluate_parallel(objects)
    } else {
        evaluator.evaluate(objects)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────────

/// Initialise tracing-subscriber using RUST_LOG (defaults to "info").
/// Set VALMAP_LOG_FORMAT=json for newline-delimited JSON logs.  Logs go to
/// stderr; stdout carries only the field output.
fn init_logging() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("VALMAP_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
