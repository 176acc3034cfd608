use std::sync::Arc;

use tracing::debug;

use crate::models::{ClassifierGroup, LicenseStatus, ResolvedLicense};
use crate::reference::aliases::AliasTables;

/// Full name of the one license that has no classifier equivalent.
const THE_UNLICENSE: &str = "the unlicense";

/// Decides whether a resolved license and classifier groups agree.
pub struct Comparator {
    aliases: Arc<AliasTables>,
}

impl Comparator {
    pub fn new(aliases: Arc<AliasTables>) -> Self {
        Self { aliases }
    }

    /// `true` when nothing contradicts: either side is missing, or some
    /// classifier group shares a spelling with the license, is aliased to it,
    /// or the license cannot be contradicted (`UNKNOWN`, The Unlicense).
    pub fn matches(&self, license: Option<&ResolvedLicense>, classifiers: &[ClassifierGroup]) -> bool {
        let Some(license) = license else {
            return true;
        };
        if classifiers.is_empty() {
            return true;
        }

        for classifier in classifiers {
            debug!(
                license = %license.full_name,
                classifier = classifier.name(),
                "comparing license and classifier"
            );
            if overlaps(license, classifier)
                || self.is_alias(license, classifier)
                || license.status == LicenseStatus::Unknown
                || license.full_name.to_lowercase() == THE_UNLICENSE
            {
                debug!("found match or alias");
                return true;
            }
        }

        debug!(license = %license.full_name, "license and classifier disagree");
        false
    }

    /// Whether the classifier's display name is aliased to this license.
    pub fn is_alias(&self, license: &ResolvedLicense, classifier: &ClassifierGroup) -> bool {
        self.aliases
            .classifier_aliases(classifier.name())
            .iter()
            .any(|alias| *alias == license.identifier_spdx || *alias == license.full_name)
    }
}

fn overlaps(license: &ResolvedLicense, classifier: &ClassifierGroup) -> bool {
    license.spellings().any(|spelling| {
        classifier
            .spellings()
            .iter()
            .any(|c| c.eq_ignore_ascii_case(spelling))
    })
}
