//! Reference data the resolvers work against, loaded once per run.
//!
//! - [`spdx`] — license groups built from the SPDX license list.
//! - [`classifiers`] — classifier groups built from the PyPI classifier list.
//! - [`aliases`] — alias dictionaries (license names, classifier equivalents,
//!   licenses without a version).
//!
//! Each table is taken from the first usable source: remote (when enabled),
//! then a local override file, then the copy embedded in the binary.

pub mod aliases;
pub mod classifiers;
pub mod spdx;

use std::path::Path;

use reqwest::Client;
use tracing::{info, warn};

use crate::config::ReferenceConfig;
use crate::error::{Result, SolverError};

use classifiers::ClassifierTable;
use spdx::LicenseTable;

pub const SPDX_LICENSES_URL: &str =
    "https://raw.githubusercontent.com/spdx/license-list-data/main/json/licenses.json";
pub const PYPI_CLASSIFIERS_URL: &str = "https://pypi.org/pypi?%3Aaction=list_classifiers";

const EMBEDDED_SPDX_LICENSES: &str = include_str!("../../data/spdx_licenses.json");
const EMBEDDED_PYPI_CLASSIFIERS: &str = include_str!("../../data/pypi_classifiers.txt");

/// License groups and classifier groups, immutable after loading.
#[derive(Debug)]
pub struct ReferenceTables {
    pub licenses: LicenseTable,
    pub classifiers: ClassifierTable,
}

impl ReferenceTables {
    /// Tables built from the data embedded in the binary.
    pub fn embedded() -> Result<Self> {
        Ok(Self {
            licenses: LicenseTable::from_spdx_json(EMBEDDED_SPDX_LICENSES)?,
            classifiers: ClassifierTable::from_text(EMBEDDED_PYPI_CLASSIFIERS),
        })
    }

    /// Load both tables according to `config`.
    ///
    /// Fails with [`SolverError::ReferenceDataUnavailable`] only when no source
    /// yields a non-empty table.
    pub async fn load(config: &ReferenceConfig, client: &Client) -> Result<Self> {
        let mut spdx_sources = Vec::new();
        let mut classifier_sources = Vec::new();

        if config.remote {
            spdx_sources.push((
                SPDX_LICENSES_URL.to_string(),
                fetch_text(client, SPDX_LICENSES_URL).await,
            ));
            classifier_sources.push((
                PYPI_CLASSIFIERS_URL.to_string(),
                fetch_text(client, PYPI_CLASSIFIERS_URL).await,
            ));
        }
        if let Some(path) = &config.spdx_licenses {
            spdx_sources.push((path.display().to_string(), read_text(path)));
        }
        if let Some(path) = &config.pypi_classifiers {
            classifier_sources.push((path.display().to_string(), read_text(path)));
        }
        spdx_sources.push((
            "embedded SPDX license list".to_string(),
            Ok(EMBEDDED_SPDX_LICENSES.to_string()),
        ));
        classifier_sources.push((
            "embedded PyPI classifier list".to_string(),
            Ok(EMBEDDED_PYPI_CLASSIFIERS.to_string()),
        ));

        let licenses = select_source(
            "SPDX license list",
            spdx_sources,
            LicenseTable::from_spdx_json,
            LicenseTable::len,
        )?;
        let classifiers = select_source(
            "PyPI classifier list",
            classifier_sources,
            |text| Ok(ClassifierTable::from_text(text)),
            ClassifierTable::len,
        )?;

        info!(
            licenses = licenses.len(),
            classifiers = classifiers.len(),
            "reference tables loaded"
        );
        Ok(Self {
            licenses,
            classifiers,
        })
    }
}

/// Parse candidate sources in order and keep the first non-empty table.
fn select_source<T>(
    kind: &str,
    sources: Vec<(String, Result<String>)>,
    parse: impl Fn(&str) -> Result<T>,
    len: impl Fn(&T) -> usize,
) -> Result<T> {
    for (origin, text) in sources {
        match text.and_then(|text| parse(&text)) {
            Ok(table) if len(&table) > 0 => {
                info!(source = %origin, "using {kind}");
                return Ok(table);
            }
            Ok(_) => warn!(source = %origin, "{kind} is empty"),
            Err(e) => warn!(source = %origin, error = %e, "could not load {kind}"),
        }
    }
    Err(SolverError::ReferenceDataUnavailable(format!(
        "no usable {kind}"
    )))
}

fn read_text(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .header("User-Agent", concat!("license-solver/", env!("CARGO_PKG_VERSION")))
        .send()
        .await?
        .error_for_status()?;
    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_embedded_tables() {
        let tables = ReferenceTables::embedded().unwrap();
        assert!(!tables.licenses.is_empty());
        assert!(!tables.classifiers.is_empty());
        assert!(tables
            .classifiers
            .groups()
            .iter()
            .all(|g| g.raw().starts_with("License")));
    }

    #[test]
    fn test_select_source_falls_through() {
        let sources = vec![
            ("broken".to_string(), Ok("not json".to_string())),
            (
                "missing".to_string(),
                Err(SolverError::Config("missing".to_string())),
            ),
            ("empty".to_string(), Ok(r#"{"licenses": []}"#.to_string())),
            (
                "good".to_string(),
                Ok(r#"{"licenses": [{"name": "MIT License", "licenseId": "MIT"}]}"#.to_string()),
            ),
        ];
        let table = select_source(
            "SPDX license list",
            sources,
            LicenseTable::from_spdx_json,
            LicenseTable::len,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_select_source_unavailable() {
        let sources = vec![("empty".to_string(), Ok(String::new()))];
        let err = select_source(
            "PyPI classifier list",
            sources,
            |text| Ok(ClassifierTable::from_text(text)),
            ClassifierTable::len,
        )
        .unwrap_err();
        assert!(matches!(err, SolverError::ReferenceDataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_load_local_override() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "License :: OSI Approved :: MIT License").unwrap();

        let config = ReferenceConfig {
            remote: false,
            spdx_licenses: None,
            pypi_classifiers: Some(f.path().to_path_buf()),
        };
        let tables = ReferenceTables::load(&config, &Client::new()).await.unwrap();
        assert_eq!(tables.classifiers.len(), 1);
        assert!(tables.licenses.len() > 1);
    }
}
