//! `license-solver` — resolve package license metadata to SPDX licenses and
//! cross-check it against PyPI classifiers.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and load config ([`config::load_config`]).
//! 2. Load reference tables and alias dictionaries ([`reference`]).
//! 3. Read metadata from files, a directory ([`metadata`]) or PyPI ([`registry`]).
//! 4. Resolve, compare and aggregate each record ([`solver`], [`license`], [`report`]).
//! 5. Emit the JSON or terminal report.
//! 6. Exit `1` with `--fail-on-warning` when any record carries a warning.

mod cli;
mod config;
mod error;
mod license;
mod metadata;
mod models;
mod reference;
mod registry;
mod report;
mod solver;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, ReportFormat};
use config::{load_config, output_indent};
use metadata::files::{DirectorySource, FileSource};
use reference::aliases::AliasTables;
use reference::ReferenceTables;
use registry::pypi::PackageSpec;
use solver::Solver;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose || cli.debug {
        "license_solver=debug"
    } else {
        "license_solver=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd, cli.config.as_deref())?;

    let mut aliases = AliasTables::builtin()?;
    if !config.aliases.is_empty() {
        debug!("merging configured aliases");
        aliases.extend(config.aliases.clone());
    }

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let mut reference_config = config.reference.clone();
    reference_config.remote |= cli.remote_reference;
    let tables = ReferenceTables::load(&reference_config, &client).await?;

    let mut solver = Solver::new(tables, aliases);

    if !cli.file.is_empty() {
        solver.solve_source(&FileSource::new(cli.file.clone()))?;
    }
    if let Some(dir) = &cli.directory {
        solver
            .solve_source(&DirectorySource::new(dir))
            .with_context(|| format!("cannot read directory {}", dir.display()))?;
    }

    let mut fetch_failures = 0;
    if !cli.pypi.is_empty() {
        for (spec, result) in fetch_pypi(&client, &cli.pypi, cli.quiet).await? {
            match result {
                Ok(Some(value)) => solver.solve_value(&value, &spec.url()),
                Ok(None) => {
                    warn!(package = %spec, "package not found on PyPI");
                    fetch_failures += 1;
                }
                Err(e) => {
                    warn!(package = %spec, error = %e, "PyPI request failed");
                    fetch_failures += 1;
                }
            }
        }
    }

    let skipped = solver.skipped();
    if skipped.total() > 0 || fetch_failures > 0 {
        eprintln!(
            "  {} skipped: {} malformed, {} not JSON, {} without name/version, {} not fetched",
            "→".cyan(),
            skipped.malformed,
            skipped.not_json,
            skipped.unidentified,
            fetch_failures,
        );
    }

    let report = solver.into_report();

    match cli.report {
        ReportFormat::Json => {
            let json = report.to_json(output_indent(&config, cli.indent))?;
            match &cli.output {
                Some(path) => std::fs::write(path, json + "\n")
                    .with_context(|| format!("cannot write {}", path.display()))?,
                None => println!("{}", json),
            }
        }
        ReportFormat::Terminal => {
            report::terminal::render(&report, cli.verbose, cli.quiet);
        }
    }

    if cli.fail_on_warning && report.warning_count() > 0 {
        std::process::exit(1);
    }

    Ok(())
}

type FetchResult = error::Result<Option<Value>>;

/// Fetch PyPI metadata in concurrent batches; results keep the order of `specs`.
async fn fetch_pypi(
    client: &reqwest::Client,
    specs: &[PackageSpec],
    quiet: bool,
) -> Result<Vec<(PackageSpec, FetchResult)>> {
    const BATCH_SIZE: usize = 75;

    let pb = if !quiet {
        let pb = ProgressBar::new(specs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut results = Vec::with_capacity(specs.len());
    for batch in specs.chunks(BATCH_SIZE) {
        let futures: Vec<_> = batch
            .iter()
            .map(|spec| registry::pypi::fetch_metadata(client, spec))
            .collect();

        for (spec, result) in batch.iter().zip(join_all(futures).await) {
            results.push((spec.clone(), result));
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    Ok(results)
}
