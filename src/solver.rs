//! End-to-end pipeline: metadata → resolved record → aggregated report.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, SolverError};
use crate::license::classifier::ClassifierResolver;
use crate::license::resolver::LicenseResolver;
use crate::metadata::{MetadataRecord, MetadataSource, Observation};
use crate::models::PackageRecord;
use crate::reference::aliases::AliasTables;
use crate::reference::ReferenceTables;
use crate::report::{Aggregator, Outcome, Report};

/// Records that did not make it into the report, by reason.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SkipStats {
    pub not_json: usize,
    pub malformed: usize,
    pub unidentified: usize,
}

impl SkipStats {
    pub fn total(&self) -> usize {
        self.not_json + self.malformed + self.unidentified
    }
}

pub struct Solver {
    licenses: LicenseResolver,
    classifiers: ClassifierResolver,
    aliases: Arc<AliasTables>,
    aggregator: Aggregator,
    skipped: SkipStats,
}

impl Solver {
    pub fn new(tables: ReferenceTables, aliases: AliasTables) -> Self {
        let aliases = Arc::new(aliases);
        Self {
            licenses: LicenseResolver::new(Arc::new(tables.licenses), aliases.clone()),
            classifiers: ClassifierResolver::new(Arc::new(tables.classifiers)),
            aggregator: Aggregator::new(aliases.clone()),
            aliases,
            skipped: SkipStats::default(),
        }
    }

    /// Resolve one metadata record into a fresh [`PackageRecord`].
    pub fn build_record(&self, metadata: &MetadataRecord, source: &str) -> PackageRecord {
        let mut record = PackageRecord::new(
            metadata.package_name.clone().unwrap_or_default(),
            metadata.package_version.clone().unwrap_or_default(),
        );
        record.source_path = source.to_string();

        let license = self.licenses.resolve_license(metadata.license.as_deref());
        record.set_license(license, &self.aliases);

        if let Some(group) = self.classifiers.resolve(metadata.classifiers.as_deref()) {
            record.add_classifier(group);
        }
        record
    }

    /// Resolve and aggregate one metadata record.
    pub fn observe(&mut self, metadata: &MetadataRecord, source: &str) -> Outcome {
        let record = self.build_record(metadata, source);
        let outcome = self.aggregator.add_observation(record);
        if outcome == Outcome::Discarded {
            self.skipped.unidentified += 1;
        }
        outcome
    }

    /// Aggregate an extraction result; a failed extraction is logged and counted.
    pub fn observe_result(&mut self, observation: Observation) {
        match observation.record {
            Ok(metadata) => {
                self.observe(&metadata, &observation.source);
            }
            Err(err) => self.skip(&observation.source, err),
        }
    }

    /// Extract and aggregate one metadata JSON document.
    pub fn solve_value(&mut self, value: &Value, source: &str) {
        match MetadataRecord::from_json(value, source) {
            Ok(metadata) => {
                self.observe(&metadata, source);
            }
            Err(err) => self.skip(source, err),
        }
    }

    /// Aggregate every record of `source`, in the order it yields them.
    pub fn solve_source(&mut self, source: &dyn MetadataSource) -> Result<()> {
        for observation in source.observations()? {
            self.observe_result(observation);
        }
        Ok(())
    }

    fn skip(&mut self, source: &str, err: SolverError) {
        match err {
            SolverError::NotJson(_) => {
                warn!(source, "not a JSON file, skipped");
                self.skipped.not_json += 1;
            }
            err => {
                warn!(source, error = %err, "record skipped");
                self.skipped.malformed += 1;
            }
        }
        debug!(skipped = self.skipped.total(), "skip count");
    }

    pub fn skipped(&self) -> SkipStats {
        self.skipped
    }

    pub fn report(&self) -> &Report {
        self.aggregator.report()
    }

    pub fn into_report(self) -> Report {
        self.aggregator.into_report()
    }
}
