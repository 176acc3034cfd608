use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, SolverError};
use crate::reference::aliases::AliasTables;

/// Root configuration structure, deserialized from `.license-solver/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Where the SPDX license list and classifier list come from.
    #[serde(default)]
    pub reference: ReferenceConfig,
    /// Extra alias entries, merged on top of the built-in tables.
    #[serde(default)]
    pub aliases: AliasTables,
    /// Report output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Reference data sources.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ReferenceConfig {
    /// Try the upstream SPDX and PyPI lists before any local copy.
    #[serde(default)]
    pub remote: bool,
    /// Local SPDX license-list JSON to use instead of the embedded copy.
    pub spdx_licenses: Option<PathBuf>,
    /// Local classifier list (one per line) to use instead of the embedded copy.
    pub pypi_classifiers: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON with this indent; compact when absent.
    pub indent: Option<usize>,
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.license-solver/config.toml`
/// 3. `~/.config/license-solver/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".license-solver").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("license-solver")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    debug!(path = %path.display(), "loading config");
    let content = std::fs::read_to_string(path)
        .map_err(|e| SolverError::Config(format!("{}: {e}", path.display())))?;
    let mut config: Config = toml::from_str(&content)?;

    // Relative reference paths are taken relative to the config file.
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for slot in [
        &mut config.reference.spdx_licenses,
        &mut config.reference.pypi_classifiers,
    ] {
        if let Some(p) = slot.as_mut() {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }

    Ok(config)
}

/// Resolve the indent: CLI flag first, then config.
pub fn output_indent(config: &Config, cli_indent: Option<usize>) -> Option<usize> {
    cli_indent.or(config.output.indent)
}
