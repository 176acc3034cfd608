use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::error::Result;

const BUILTIN_ALIASES: &str = include_str!("../../data/aliases.toml");

/// Static alias data consulted by the resolvers and the comparator.
///
/// The same shape is used for the built-in table and for the `[aliases]`
/// section of the config file; [`AliasTables::extend`] merges the two.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AliasTables {
    /// SPDX ids whose identifier carries no version.
    #[serde(default)]
    without_version: HashSet<String>,
    /// Lowercased free-text license name → SPDX id.
    #[serde(default)]
    licenses: HashMap<String, String>,
    /// Classifier display name → license ids (or full names) it covers.
    #[serde(default)]
    classifiers: HashMap<String, Vec<String>>,
}

impl AliasTables {
    /// Alias tables compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_ALIASES)
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        let parsed: AliasTables = toml::from_str(data)?;
        let mut tables = AliasTables::default();
        tables.extend(parsed);
        Ok(tables)
    }

    /// Merge `other` into `self`; entries in `other` win on key collisions.
    pub fn extend(&mut self, other: AliasTables) {
        self.without_version.extend(other.without_version);
        self.licenses.extend(
            other
                .licenses
                .into_iter()
                .map(|(name, id)| (name.to_lowercase(), id)),
        );
        for (classifier, licenses) in other.classifiers {
            let entry = self.classifiers.entry(classifier).or_default();
            for license in licenses {
                if !entry.contains(&license) {
                    entry.push(license);
                }
            }
        }
    }

    /// SPDX id aliased to a free-text license name.
    pub fn license_alias(&self, name: &str) -> Option<&str> {
        self.licenses.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Licenses a classifier display name is known to stand for.
    pub fn classifier_aliases(&self, classifier_name: &str) -> &[String] {
        self.classifiers
            .get(classifier_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_without_version(&self, spdx_id: &str) -> bool {
        self.without_version.contains(spdx_id)
    }

    pub fn is_empty(&self) -> bool {
        self.without_version.is_empty() && self.licenses.is_empty() && self.classifiers.is_empty()
    }
}
