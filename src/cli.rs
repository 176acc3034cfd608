use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::registry::pypi::PackageSpec;

#[derive(Parser, Debug)]
#[command(
    name = "license-solver",
    about = "Resolve package license metadata to SPDX licenses and check it against classifiers",
    version
)]
#[command(group(ArgGroup::new("input").required(true).multiple(true).args(["file", "directory", "pypi"])))]
pub struct Cli {
    /// Metadata JSON file (repeatable)
    #[arg(short, long, value_name = "FILE", conflicts_with = "directory")]
    pub file: Vec<PathBuf>,

    /// Directory of metadata JSON files
    #[arg(short, long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Fetch metadata from PyPI for NAME or NAME==VERSION (repeatable)
    #[arg(long, value_name = "SPEC")]
    pub pypi: Vec<PackageSpec>,

    /// Config file [default: ./.license-solver/config.toml, fallback ~/.config/license-solver/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub report: ReportFormat,

    /// Write the JSON report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON with this indent
    #[arg(long, value_name = "N")]
    pub indent: Option<usize>,

    /// Refresh the SPDX license list and classifier list from upstream
    #[arg(long)]
    pub remote_reference: bool,

    /// Exit with status 1 when any package carries a warning
    #[arg(long)]
    pub fail_on_warning: bool,

    /// Debug logging; terminal report lists all packages
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print summary line
    #[arg(short, long)]
    pub quiet: bool,

    /// Turn on debug logging
    #[arg(
        long,
        env = "LICENSE_SOLVER_DEBUG",
        hide = true,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Json,
    Terminal,
}
