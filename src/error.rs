use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the resolution pipeline.
///
/// Unresolved licenses and classifier mismatches are not errors: they flow
/// into the report as sentinel values and `warning` flags.
#[derive(Debug, Error)]
pub enum SolverError {
    /// No SPDX license list or classifier list could be loaded from any source.
    #[error("reference data unavailable: {0}")]
    ReferenceDataUnavailable(String),

    /// A single metadata record could not be read or parsed.
    #[error("malformed record {source_name}: {reason}")]
    MalformedRecord { source_name: String, reason: String },

    #[error("not a JSON file: {}", .0.display())]
    NotJson(PathBuf),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SolverError {
    pub fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        SolverError::MalformedRecord {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;
