use std::fmt;
use std::str::FromStr;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SolverError};

const PYPI_BASE_URL: &str = "https://pypi.org/pypi";

/// A `NAME` or `NAME==VERSION` package requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub version: Option<String>,
}

impl FromStr for PackageSpec {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, version) = match s.split_once("==") {
            Some((name, version)) => (name.trim(), Some(version.trim())),
            None => (s.trim(), None),
        };
        if name.is_empty() || version.is_some_and(str::is_empty) {
            return Err(SolverError::malformed(s, "expected NAME or NAME==VERSION"));
        }
        Ok(Self {
            name: name.to_string(),
            version: version.map(str::to_string),
        })
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}=={}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

impl PackageSpec {
    /// PyPI JSON API endpoint; the latest release when no version is pinned.
    pub fn url(&self) -> String {
        match &self.version {
            Some(version) => format!("{}/{}/{}/json", PYPI_BASE_URL, self.name, version),
            None => format!("{}/{}/json", PYPI_BASE_URL, self.name),
        }
    }
}

/// Fetch the JSON metadata document for a package from PyPI.
pub async fn fetch_metadata(client: &Client, spec: &PackageSpec) -> Result<Option<Value>> {
    let url = spec.url();
    debug!(%url, "fetching package metadata");

    let response = client
        .get(&url)
        .header("User-Agent", concat!("license-solver/", env!("CARGO_PKG_VERSION")))
        .send()
        .await?;

    if response.status() == StatusCode::NOT_FOUND {
        return Ok(None);
    }

    let data: Value = response.error_for_status()?.json().await?;
    Ok(Some(data))
}
