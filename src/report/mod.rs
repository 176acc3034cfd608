//! Aggregation of package observations into the final report, and renderers.
//!
//! - [`Aggregator`] — merges repeated observations of a package/version.
//! - [`Report`] — name → version → record, serialized as the JSON report.
//! - [`terminal`] — colored table output.

pub mod terminal;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::license::comparator::Comparator;
use crate::models::{PackageRecord, ResolvedLicense, UNDETECTED};
use crate::reference::aliases::AliasTables;

/// Package name → version → aggregated record.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    packages: BTreeMap<String, BTreeMap<String, PackageRecord>>,
}

/// Flattened view of one report entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseSummary {
    pub license: String,
    pub license_identifier: String,
    pub license_version: String,
    pub warning: bool,
}

impl Report {
    pub fn get(&self, name: &str, version: &str) -> Option<&PackageRecord> {
        self.packages.get(name)?.get(version)
    }

    /// Summary of one entry; a missing entry reports `UNDETECTED` with a warning.
    pub fn summary(&self, name: &str, version: &str) -> LicenseSummary {
        let Some(record) = self.get(name, version) else {
            return LicenseSummary {
                license: UNDETECTED.to_string(),
                license_identifier: UNDETECTED.to_string(),
                license_version: UNDETECTED.to_string(),
                warning: true,
            };
        };

        let (license, license_identifier) = match &record.license {
            Some(l) => (l.full_name.clone(), l.identifier_spdx.clone()),
            None => (UNDETECTED.to_string(), UNDETECTED.to_string()),
        };
        LicenseSummary {
            license,
            license_identifier,
            license_version: record.license_version.clone(),
            warning: record.warning,
        }
    }

    /// All records, ordered by name then version.
    pub fn records(&self) -> impl Iterator<Item = &PackageRecord> {
        self.packages.values().flat_map(BTreeMap::values)
    }

    /// Number of package/version entries.
    pub fn len(&self) -> usize {
        self.packages.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.records().filter(|r| r.warning).count()
    }

    /// Serialize as JSON; compact unless an indent width is given.
    pub fn to_json(&self, indent: Option<usize>) -> serde_json::Result<String> {
        let Some(width) = indent else {
            return serde_json::to_string(self);
        };
        let indent = vec![b' '; width];
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// What [`Aggregator::add_observation`] did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// First observation of this package/version.
    Inserted,
    /// Merged into an existing entry (fields adopted or warning raised).
    Merged,
    /// Identical to the stored entry, or the stored entry is already flagged.
    Unchanged,
    /// Missing name or version.
    Discarded,
}

/// Sole owner of the [`Report`]; every write goes through
/// [`Aggregator::add_observation`].
pub struct Aggregator {
    report: Report,
    comparator: Comparator,
    aliases: Arc<AliasTables>,
}

impl Aggregator {
    pub fn new(aliases: Arc<AliasTables>) -> Self {
        Self {
            report: Report::default(),
            comparator: Comparator::new(aliases.clone()),
            aliases,
        }
    }

    /// Check `record` for license/classifier consistency and merge it into the report.
    pub fn add_observation(&mut self, mut record: PackageRecord) -> Outcome {
        if record.name.is_empty() || record.version.is_empty() {
            debug!(source = %record.source_path, "no package name or version, record discarded");
            return Outcome::Discarded;
        }

        if !self
            .comparator
            .matches(record.license.as_ref(), &record.classifier)
        {
            record.warning = true;
        }

        let versions = self.report.packages.entry(record.name.clone()).or_default();
        match versions.get_mut(&record.version) {
            None => {
                debug!(name = %record.name, version = %record.version, warning = record.warning, "package added");
                versions.insert(record.version.clone(), record);
                Outcome::Inserted
            }
            Some(stored) => merge(stored, record, &self.comparator, &self.aliases),
        }
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn into_report(self) -> Report {
        self.report
    }
}

fn merge(
    stored: &mut PackageRecord,
    new: PackageRecord,
    comparator: &Comparator,
    aliases: &AliasTables,
) -> Outcome {
    if stored.warning || stored.same_observation(&new) {
        return Outcome::Unchanged;
    }

    let PackageRecord {
        license,
        classifier,
        warning,
        ..
    } = new;

    match license.filter(ResolvedLicense::is_set) {
        Some(license) if !stored.has_license() => {
            debug!(name = %stored.name, version = %stored.version, license = %license.full_name, "license adopted");
            stored.set_license(license, aliases);
        }
        Some(license) if stored.license.as_ref() != Some(&license) => {
            debug!(name = %stored.name, version = %stored.version, "conflicting license, warning set");
            stored.warning = true;
        }
        _ => {}
    }

    if !classifier.is_empty() {
        if !stored.has_classifier() {
            debug!(name = %stored.name, version = %stored.version, "classifier adopted");
            stored.classifier = classifier;
        } else if stored.classifier != classifier {
            debug!(name = %stored.name, version = %stored.version, "conflicting classifier, warning set");
            stored.warning = true;
        }
    }

    if warning {
        stored.warning = true;
    }

    // adopted fields must still agree with what was already stored
    if !stored.warning && !comparator.matches(stored.license.as_ref(), &stored.classifier) {
        debug!(name = %stored.name, version = %stored.version, "merged license and classifier disagree, warning set");
        stored.warning = true;
    }

    Outcome::Merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassifierGroup, LicenseGroup, LICENSE_WITHOUT_VERSION};

    fn aggregator() -> Aggregator {
        Aggregator::new(Arc::new(AliasTables::builtin().unwrap()))
    }

    fn aliases() -> AliasTables {
        AliasTables::builtin().unwrap()
    }

    fn license(spellings: &[&str]) -> ResolvedLicense {
        ResolvedLicense::from_group(&LicenseGroup::new(
            spellings.iter().map(|s| s.to_string()).collect(),
        ))
    }

    fn mit() -> ResolvedLicense {
        license(&["MIT License", "MIT", "MIT"])
    }

    fn apache_1_1() -> ResolvedLicense {
        license(&["Apache License 1.1", "Apache-1.1", "Apache 1.1"])
    }

    fn mit_classifier() -> ClassifierGroup {
        ClassifierGroup::new(vec![
            "License :: OSI Approved :: MIT License".into(),
            "MIT License".into(),
        ])
    }

    fn record(name: &str, version: &str, license: Option<ResolvedLicense>) -> PackageRecord {
        let mut record = PackageRecord::new(name, version);
        if let Some(license) = license {
            record.set_license(license, &aliases());
        }
        record
    }

    #[test]
    fn test_discards_unidentified() {
        let mut agg = aggregator();
        assert_eq!(agg.add_observation(record("", "1.0", Some(mit()))), Outcome::Discarded);
        assert_eq!(agg.add_observation(record("pkg", "", Some(mit()))), Outcome::Discarded);
        assert!(agg.report().is_empty());
    }

    #[test]
    fn test_identical_observation_is_idempotent() {
        let mut once = aggregator();
        let mut r = record("pkg", "1.0", Some(mit()));
        r.add_classifier(mit_classifier());
        once.add_observation(r.clone());

        let mut twice = aggregator();
        assert_eq!(twice.add_observation(r.clone()), Outcome::Inserted);
        assert_eq!(twice.add_observation(r), Outcome::Unchanged);

        assert_eq!(once.report(), twice.report());
        assert!(!twice.report().get("pkg", "1.0").unwrap().warning);
    }

    #[test]
    fn test_conflicting_license_keeps_first() {
        let mut agg = aggregator();
        let mut first = record("pkg", "1.0", Some(mit()));
        first.add_classifier(mit_classifier());
        let mut second = record("pkg", "1.0", Some(apache_1_1()));
        second.add_classifier(mit_classifier());

        agg.add_observation(first);
        assert_eq!(agg.add_observation(second), Outcome::Merged);

        let stored = agg.report().get("pkg", "1.0").unwrap();
        assert!(stored.warning);
        assert_eq!(stored.license, Some(mit()));
        assert_eq!(stored.license_version, LICENSE_WITHOUT_VERSION);
    }

    #[test]
    fn test_unset_fields_are_adopted() {
        let mut agg = aggregator();
        agg.add_observation(record("pkg", "1.0", Some(ResolvedLicense::unknown())));

        let mut second = record("pkg", "1.0", Some(apache_1_1()));
        second.add_classifier(ClassifierGroup::new(vec![
            "License :: OSI Approved :: Apache Software License".into(),
            "Apache Software License".into(),
        ]));
        assert_eq!(agg.add_observation(second), Outcome::Merged);

        let stored = agg.report().get("pkg", "1.0").unwrap();
        assert!(!stored.warning);
        assert_eq!(stored.license, Some(apache_1_1()));
        assert_eq!(stored.license_version, "1.1");
        assert_eq!(stored.classifier.len(), 1);
    }

    #[test]
    fn test_sentinel_never_overwrites_set_license() {
        let mut agg = aggregator();
        agg.add_observation(record("pkg", "1.0", Some(mit())));
        agg.add_observation(record("pkg", "1.0", Some(ResolvedLicense::undetected())));

        let stored = agg.report().get("pkg", "1.0").unwrap();
        assert!(!stored.warning);
        assert_eq!(stored.license, Some(mit()));
    }

    fn apache_classifier() -> ClassifierGroup {
        ClassifierGroup::new(vec![
            "License :: OSI Approved :: Apache Software License".into(),
            "Apache Software License".into(),
        ])
    }

    #[test]
    fn test_adopted_classifier_checked_against_stored_license() {
        let mut agg = aggregator();
        agg.add_observation(record("pkg", "1.0", Some(mit())));

        let mut second = record("pkg", "1.0", Some(ResolvedLicense::unknown()));
        second.add_classifier(apache_classifier());
        assert_eq!(agg.add_observation(second), Outcome::Merged);

        let stored = agg.report().get("pkg", "1.0").unwrap();
        assert_eq!(stored.license, Some(mit()));
        assert_eq!(stored.classifier, vec![apache_classifier()]);
        assert!(stored.warning);
    }

    #[test]
    fn test_adopted_license_checked_against_stored_classifier() {
        let mut agg = aggregator();
        let mut first = record("pkg", "1.0", Some(ResolvedLicense::unknown()));
        first.add_classifier(apache_classifier());
        agg.add_observation(first);
        assert!(!agg.report().get("pkg", "1.0").unwrap().warning);

        assert_eq!(
            agg.add_observation(record("pkg", "1.0", Some(mit()))),
            Outcome::Merged
        );

        let stored = agg.report().get("pkg", "1.0").unwrap();
        assert_eq!(stored.license, Some(mit()));
        assert_eq!(stored.classifier, vec![apache_classifier()]);
        assert!(stored.warning);
    }

    #[test]
    fn test_warning_is_sticky() {
        let mut agg = aggregator();
        let mut mismatched = record("pkg", "2.0", Some(apache_1_1()));
        mismatched.add_classifier(mit_classifier());
        agg.add_observation(mismatched);
        assert!(agg.report().get("pkg", "2.0").unwrap().warning);

        let clean = record("pkg", "2.0", Some(mit()));
        assert_eq!(agg.add_observation(clean), Outcome::Unchanged);
        let stored = agg.report().get("pkg", "2.0").unwrap();
        assert!(stored.warning);
        assert_eq!(stored.license, Some(apache_1_1()));
    }

    #[test]
    fn test_later_mismatch_flags_stored_record() {
        let mut agg = aggregator();
        agg.add_observation(record("pkg", "1.0", Some(apache_1_1())));

        let mut mismatched = record("pkg", "1.0", Some(apache_1_1()));
        mismatched.add_classifier(mit_classifier());
        agg.add_observation(mismatched);

        let stored = agg.report().get("pkg", "1.0").unwrap();
        assert!(stored.warning);
        assert_eq!(stored.classifier, vec![mit_classifier()]);
    }

    #[test]
    fn test_versions_kept_apart() {
        let mut agg = aggregator();
        agg.add_observation(record("pkg", "1.0", Some(mit())));
        agg.add_observation(record("pkg", "2.0", Some(apache_1_1())));
        agg.add_observation(record("other", "0.1", None));

        let report = agg.into_report();
        assert_eq!(report.len(), 3);
        let names: Vec<_> = report.records().map(|r| (r.name.as_str(), r.version.as_str())).collect();
        assert_eq!(names, vec![("other", "0.1"), ("pkg", "1.0"), ("pkg", "2.0")]);
    }

    #[test]
    fn test_summary() {
        let mut agg = aggregator();
        agg.add_observation(record("pkg", "2.0", Some(apache_1_1())));
        let report = agg.into_report();

        assert_eq!(
            report.summary("pkg", "2.0"),
            LicenseSummary {
                license: "Apache License 1.1".to_string(),
                license_identifier: "Apache-1.1".to_string(),
                license_version: "1.1".to_string(),
                warning: false,
            }
        );

        let missing = report.summary("pkg", "9.9");
        assert_eq!(missing.license, UNDETECTED);
        assert_eq!(missing.license_identifier, UNDETECTED);
        assert_eq!(missing.license_version, UNDETECTED);
        assert!(missing.warning);
    }

    #[test]
    fn test_to_json_indent() {
        let mut agg = aggregator();
        agg.add_observation(record("pkg", "1.0", None));
        let report = agg.into_report();

        let compact = report.to_json(None).unwrap();
        assert!(compact.starts_with(r#"{"pkg":{"1.0":{"license":"#));

        let pretty = report.to_json(Some(2)).unwrap();
        assert!(pretty.starts_with("{\n  \"pkg\": {\n    \"1.0\""));
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&pretty).unwrap(),
            serde_json::from_str::<serde_json::Value>(&compact).unwrap()
        );
        assert_eq!(Report::default().to_json(None).unwrap(), "{}");
    }

    #[test]
    fn test_report_json_shape() {
        let mut agg = aggregator();
        let mut r = record("pkg", "1.0", Some(mit()));
        r.add_classifier(mit_classifier());
        agg.add_observation(r);

        let value = serde_json::to_value(agg.report()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"pkg": {"1.0": {
                "license": {"full_name": "MIT License", "identifier_spdx": "MIT", "identifier": "MIT"},
                "license_version": "LICENSE-WITHOUT-VERSION",
                "classifier": [["License :: OSI Approved :: MIT License", "MIT License"]],
                "warning": false
            }}})
        );
    }
}
