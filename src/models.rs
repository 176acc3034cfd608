use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::license::version::strip_version;
use crate::reference::aliases::AliasTables;

/// Marks a field that could not be determined.
pub const UNDETECTED: &str = "UNDETECTED";
/// Marks metadata that explicitly declared no license.
pub const UNKNOWN: &str = "UNKNOWN";
/// Marks licenses known to never carry a version suffix.
pub const LICENSE_WITHOUT_VERSION: &str = "LICENSE-WITHOUT-VERSION";

/// Synonymous spellings of one SPDX license:
/// `[full name, SPDX id, id with spaces instead of hyphens]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseGroup(Vec<String>);

impl LicenseGroup {
    pub fn new(spellings: Vec<String>) -> Self {
        Self(spellings)
    }

    pub fn full_name(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or(UNDETECTED)
    }

    pub fn spdx_id(&self) -> &str {
        self.0.get(1).map(String::as_str).unwrap_or(UNDETECTED)
    }

    /// Last spelling; for SPDX-derived groups this is the spaced identifier.
    pub fn identifier(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or(UNDETECTED)
    }

    pub fn spellings(&self) -> &[String] {
        &self.0
    }
}

/// Spellings of one `License ::` classifier line:
/// `[raw line, display name, name without abbreviation, abbreviation, ...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClassifierGroup(Vec<String>);

impl ClassifierGroup {
    pub fn new(spellings: Vec<String>) -> Self {
        Self(spellings)
    }

    pub fn raw(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or(UNDETECTED)
    }

    /// Display name (last `::` segment of the classifier line).
    pub fn name(&self) -> &str {
        self.0
            .get(1)
            .or_else(|| self.0.first())
            .map(String::as_str)
            .unwrap_or(UNDETECTED)
    }

    pub fn spellings(&self) -> &[String] {
        &self.0
    }
}

/// How a license string was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LicenseStatus {
    /// Matched a full SPDX group.
    Matched,
    /// Recognized by its un-versioned identifier only.
    Unversioned,
    /// Metadata declared no license.
    Unknown,
    /// Nothing matched.
    #[default]
    Undetected,
}

/// Canonical identity of a resolved license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLicense {
    pub full_name: String,
    pub identifier_spdx: String,
    pub identifier: String,
    #[serde(skip)]
    pub status: LicenseStatus,
}

impl ResolvedLicense {
    pub fn from_group(group: &LicenseGroup) -> Self {
        Self {
            full_name: group.full_name().to_string(),
            identifier_spdx: group.spdx_id().to_string(),
            identifier: group.identifier().to_string(),
            status: LicenseStatus::Matched,
        }
    }

    pub fn unversioned(name: &str) -> Self {
        Self {
            full_name: name.to_string(),
            identifier_spdx: UNDETECTED.to_string(),
            identifier: UNDETECTED.to_string(),
            status: LicenseStatus::Unversioned,
        }
    }

    pub fn unknown() -> Self {
        Self {
            full_name: UNKNOWN.to_string(),
            identifier_spdx: UNDETECTED.to_string(),
            identifier: UNDETECTED.to_string(),
            status: LicenseStatus::Unknown,
        }
    }

    pub fn undetected() -> Self {
        Self {
            full_name: UNDETECTED.to_string(),
            identifier_spdx: UNDETECTED.to_string(),
            identifier: UNDETECTED.to_string(),
            status: LicenseStatus::Undetected,
        }
    }

    /// Whether this carries real license information rather than a sentinel.
    pub fn is_set(&self) -> bool {
        matches!(
            self.status,
            LicenseStatus::Matched | LicenseStatus::Unversioned
        )
    }

    /// Non-sentinel spellings, used for overlap checks against classifiers.
    pub fn spellings(&self) -> impl Iterator<Item = &str> {
        [
            self.full_name.as_str(),
            self.identifier_spdx.as_str(),
            self.identifier.as_str(),
        ]
        .into_iter()
        .filter(|s| *s != UNDETECTED && *s != UNKNOWN)
    }
}

/// One package/version observation, and the aggregated entry in the report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageRecord {
    pub name: String,
    pub version: String,
    pub license: Option<ResolvedLicense>,
    pub license_version: String,
    pub classifier: Vec<ClassifierGroup>,
    pub warning: bool,
    pub source_path: String,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            license_version: UNDETECTED.to_string(),
            ..Default::default()
        }
    }

    /// Set the license and derive `license_version` from it.
    pub fn set_license(&mut self, license: ResolvedLicense, aliases: &AliasTables) {
        self.license_version = license_version(&license, aliases);
        self.license = Some(license);
    }

    /// Append a classifier group; already present groups are ignored.
    pub fn add_classifier(&mut self, group: ClassifierGroup) {
        if !self.classifier.contains(&group) {
            self.classifier.push(group);
        }
    }

    pub fn has_license(&self) -> bool {
        self.license.as_ref().is_some_and(ResolvedLicense::is_set)
    }

    pub fn has_classifier(&self) -> bool {
        !self.classifier.is_empty()
    }

    /// Field-wise equality of everything that ends up in the report.
    pub fn same_observation(&self, other: &PackageRecord) -> bool {
        self.license == other.license
            && self.license_version == other.license_version
            && self.classifier == other.classifier
            && self.warning == other.warning
    }
}

/// Derive the version string for a resolved license.
pub fn license_version(license: &ResolvedLicense, aliases: &AliasTables) -> String {
    if license.status != LicenseStatus::Matched {
        return UNDETECTED.to_string();
    }
    if aliases.is_without_version(&license.identifier_spdx) {
        return LICENSE_WITHOUT_VERSION.to_string();
    }
    strip_version(&license.identifier)
        .1
        .unwrap_or_else(|| UNDETECTED.to_string())
}

impl Serialize for PackageRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let undetected = ResolvedLicense::undetected();
        let license = self.license.as_ref().unwrap_or(&undetected);
        let placeholder = [ClassifierGroup::new(vec![UNDETECTED.to_string()])];
        let classifier: &[ClassifierGroup] = if self.classifier.is_empty() {
            &placeholder
        } else {
            &self.classifier
        };

        let mut state = serializer.serialize_struct("PackageRecord", 4)?;
        state.serialize_field("license", license)?;
        state.serialize_field("license_version", &self.license_version)?;
        state.serialize_field("classifier", classifier)?;
        state.serialize_field("warning", &self.warning)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(spellings: &[&str]) -> LicenseGroup {
        LicenseGroup::new(spellings.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_license_version_without_version() {
        let aliases = AliasTables::builtin().unwrap();
        let mit = ResolvedLicense::from_group(&group(&["MIT License", "MIT", "MIT"]));
        assert_eq!(license_version(&mit, &aliases), LICENSE_WITHOUT_VERSION);
    }

    #[test]
    fn test_license_version_from_identifier() {
        let aliases = AliasTables::builtin().unwrap();
        let apache = ResolvedLicense::from_group(&group(&[
            "Apache License 1.1",
            "Apache-1.1",
            "Apache 1.1",
        ]));
        assert_eq!(license_version(&apache, &aliases), "1.1");

        let no_version = ResolvedLicense::from_group(&group(&["AAA", "AAA", "AAA"]));
        assert_eq!(license_version(&no_version, &aliases), UNDETECTED);
    }

    #[test]
    fn test_license_version_partial_and_sentinels() {
        let aliases = AliasTables::builtin().unwrap();
        assert_eq!(
            license_version(&ResolvedLicense::unversioned("LGPL"), &aliases),
            UNDETECTED
        );
        assert_eq!(
            license_version(&ResolvedLicense::unknown(), &aliases),
            UNDETECTED
        );
        assert_eq!(
            license_version(&ResolvedLicense::undetected(), &aliases),
            UNDETECTED
        );
    }

    #[test]
    fn test_unversioned_fields() {
        let lgpl = ResolvedLicense::unversioned("LGPL");
        assert_eq!(lgpl.full_name, "LGPL");
        assert_eq!(lgpl.identifier_spdx, UNDETECTED);
        assert_eq!(lgpl.identifier, UNDETECTED);
        assert_eq!(lgpl.spellings().collect::<Vec<_>>(), vec!["LGPL"]);
    }

    #[test]
    fn test_add_classifier_dedup() {
        let mut record = PackageRecord::new("pkg", "1.0");
        let mit = ClassifierGroup::new(vec![
            "License :: OSI Approved :: MIT License".into(),
            "MIT License".into(),
        ]);
        let apache = ClassifierGroup::new(vec![
            "License :: OSI Approved :: Apache Software License".into(),
            "Apache Software License".into(),
        ]);
        record.add_classifier(mit.clone());
        record.add_classifier(mit.clone());
        assert_eq!(record.classifier, vec![mit.clone()]);
        record.add_classifier(apache.clone());
        assert_eq!(record.classifier, vec![mit, apache]);
    }

    #[test]
    fn test_serialize_empty_record() {
        let record = PackageRecord::new("pkg", "1.0");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "license": {
                    "full_name": "UNDETECTED",
                    "identifier_spdx": "UNDETECTED",
                    "identifier": "UNDETECTED"
                },
                "license_version": "UNDETECTED",
                "classifier": [["UNDETECTED"]],
                "warning": false
            })
        );
    }
}
