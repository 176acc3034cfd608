use std::sync::Arc;

use tracing::debug;

use crate::license::version::{strip_bracket_groups, strip_brackets};
use crate::models::ResolvedLicense;
use crate::reference::aliases::AliasTables;
use crate::reference::spdx::LicenseTable;

/// Outcome of resolving a raw license string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseMatch {
    /// Matched the license group at this index of the [`LicenseTable`].
    Group(usize),
    /// Equal to some group's identifier with its version removed; no group matched.
    Unversioned(String),
    /// No license metadata, or the metadata said `UNKNOWN`.
    Unknown,
    /// Nothing matched.
    Undetected,
}

impl LicenseMatch {
    /// Whether the license was recognized (full or partial match).
    pub fn is_matched(&self) -> bool {
        matches!(self, LicenseMatch::Group(_) | LicenseMatch::Unversioned(_))
    }
}

/// Maps free-text license strings onto SPDX license groups.
pub struct LicenseResolver {
    table: Arc<LicenseTable>,
    aliases: Arc<AliasTables>,
}

impl LicenseResolver {
    pub fn new(table: Arc<LicenseTable>, aliases: Arc<AliasTables>) -> Self {
        Self { table, aliases }
    }

    /// Resolve `raw`, trying in order:
    ///
    /// 1. case-insensitive match against any spelling of any group,
    /// 2. the same with parenthesis characters removed,
    /// 3. the same with parenthesized substrings removed,
    /// 4. the alias dictionary (value must be a member of some group),
    /// 5. equality with a group identifier stripped of its version.
    pub fn resolve(&self, raw: Option<&str>) -> LicenseMatch {
        let Some(raw) = raw else {
            return LicenseMatch::Unknown;
        };
        if raw.eq_ignore_ascii_case("unknown") {
            return LicenseMatch::Unknown;
        }

        if let Some(idx) = self.direct_match(raw) {
            debug!(license = raw, group = idx, "license matched group");
            return LicenseMatch::Group(idx);
        }

        if let Some(idx) = self
            .aliases
            .license_alias(raw)
            .and_then(|id| self.table.find_member(id))
        {
            debug!(license = raw, group = idx, "license matched through alias");
            return LicenseMatch::Group(idx);
        }

        if self.table.is_unversioned_identifier(raw) {
            debug!(license = raw, "license matched without version");
            return LicenseMatch::Unversioned(raw.to_string());
        }

        debug!(license = raw, "license undetected");
        LicenseMatch::Undetected
    }

    /// Resolve `raw` straight into the report representation.
    pub fn resolve_license(&self, raw: Option<&str>) -> ResolvedLicense {
        let found = self.resolve(raw);
        let license = self.to_license(&found);
        debug!(license = %license.full_name, matched = found.is_matched(), "license resolved");
        license
    }

    pub fn to_license(&self, found: &LicenseMatch) -> ResolvedLicense {
        match found {
            LicenseMatch::Group(idx) => self
                .table
                .get(*idx)
                .map(ResolvedLicense::from_group)
                .unwrap_or_else(ResolvedLicense::undetected),
            LicenseMatch::Unversioned(name) => ResolvedLicense::unversioned(name),
            LicenseMatch::Unknown => ResolvedLicense::unknown(),
            LicenseMatch::Undetected => ResolvedLicense::undetected(),
        }
    }

    /// Earliest group matched by any of the three spelling variants.
    ///
    /// Taking the minimum index keeps the outcome of a group-by-group scan that
    /// checks all variants per group.
    fn direct_match(&self, raw: &str) -> Option<usize> {
        [
            raw.to_string(),
            strip_brackets(raw),
            strip_bracket_groups(raw),
        ]
        .iter()
        .filter_map(|variant| self.table.find_spelling(variant))
        .min()
    }
}
