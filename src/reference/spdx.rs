use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::license::version::strip_version;
use crate::models::LicenseGroup;

/// SPDX `licenses.json` document; only the fields used for grouping are read.
#[derive(Debug, Deserialize)]
struct SpdxLicenseList {
    licenses: Vec<SpdxLicense>,
}

#[derive(Debug, Deserialize)]
struct SpdxLicense {
    name: Option<String>,
    #[serde(rename = "licenseId")]
    license_id: Option<String>,
}

/// Immutable, indexed collection of [`LicenseGroup`]s.
///
/// Lookups return the first group (in insertion order) that contains a
/// spelling, so hashed lookup agrees with a linear first-match scan.
#[derive(Debug, Default)]
pub struct LicenseTable {
    groups: Vec<LicenseGroup>,
    /// Lowercased spelling → first group containing it.
    by_spelling: HashMap<String, usize>,
    /// Exact spelling → first group containing it.
    by_member: HashMap<String, usize>,
    /// Spaced identifiers with their version removed.
    unversioned: HashSet<String>,
}

impl LicenseTable {
    pub fn from_groups(groups: Vec<LicenseGroup>) -> Self {
        let mut by_spelling = HashMap::new();
        let mut by_member = HashMap::new();
        let mut unversioned = HashSet::new();

        for (idx, group) in groups.iter().enumerate() {
            for spelling in group.spellings() {
                by_spelling.entry(spelling.to_lowercase()).or_insert(idx);
                by_member.entry(spelling.clone()).or_insert(idx);
            }
            unversioned.insert(strip_version(group.identifier()).0);
        }

        Self {
            groups,
            by_spelling,
            by_member,
            unversioned,
        }
    }

    /// Build groups `[name, id, id with spaces]` from an SPDX license-list JSON document.
    pub fn from_spdx_json(data: &str) -> Result<Self> {
        let list: SpdxLicenseList = serde_json::from_str(data)?;
        let mut groups = Vec::with_capacity(list.licenses.len());

        for entry in list.licenses {
            let (Some(name), Some(id)) = (entry.name, entry.license_id) else {
                warn!("skipping SPDX entry without name or licenseId");
                continue;
            };
            let spaced = id.replace('-', " ");
            groups.push(LicenseGroup::new(vec![name, id, spaced]));
        }

        debug!(groups = groups.len(), "built license groups");
        Ok(Self::from_groups(groups))
    }

    pub fn groups(&self) -> &[LicenseGroup] {
        &self.groups
    }

    pub fn get(&self, idx: usize) -> Option<&LicenseGroup> {
        self.groups.get(idx)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// First group containing `spelling`, compared case-insensitively.
    pub fn find_spelling(&self, spelling: &str) -> Option<usize> {
        self.by_spelling.get(&spelling.to_lowercase()).copied()
    }

    /// First group containing exactly `spelling`.
    pub fn find_member(&self, spelling: &str) -> Option<usize> {
        self.by_member.get(spelling).copied()
    }

    /// Whether `name` equals some group's identifier with its version removed.
    pub fn is_unversioned_identifier(&self, name: &str) -> bool {
        self.unversioned.contains(name)
    }
}
