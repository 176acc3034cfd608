use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::models::ClassifierGroup;

const LICENSE_MARKER: &str = "License";

fn abbreviation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\([^()]*\)\s*").expect("abbreviation pattern is valid"))
}

/// Immutable, indexed collection of [`ClassifierGroup`]s built from `License ::` lines.
#[derive(Debug, Default)]
pub struct ClassifierTable {
    groups: Vec<ClassifierGroup>,
    /// Lowercased spelling → first group containing it.
    by_spelling: HashMap<String, usize>,
}

impl ClassifierTable {
    pub fn from_groups(groups: Vec<ClassifierGroup>) -> Self {
        let mut by_spelling = HashMap::new();
        for (idx, group) in groups.iter().enumerate() {
            for spelling in group.spellings() {
                by_spelling.entry(spelling.to_lowercase()).or_insert(idx);
            }
        }
        Self {
            groups,
            by_spelling,
        }
    }

    /// Parse a classifier list (one classifier per line), keeping license classifiers.
    pub fn from_text(data: &str) -> Self {
        let groups: Vec<ClassifierGroup> = data.lines().filter_map(classifier_group).collect();
        debug!(groups = groups.len(), "built classifier groups");
        Self::from_groups(groups)
    }

    pub fn groups(&self) -> &[ClassifierGroup] {
        &self.groups
    }

    pub fn get(&self, idx: usize) -> Option<&ClassifierGroup> {
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
}

/// Build the spellings of one classifier line, or `None` for non-license lines.
///
/// `License :: OSI Approved :: Mozilla Public License 1.0 (MPL)` becomes
/// `[line, "Mozilla Public License 1.0 (MPL)", "Mozilla Public License 1.0", "MPL"]`.
fn classifier_group(line: &str) -> Option<ClassifierGroup> {
    let line = line.trim();
    if line.len() < 7 || !line.starts_with(LICENSE_MARKER) {
        return None;
    }

    let name = extract_name(line);
    let mut spellings = vec![line.to_string(), name.clone()];

    if let Some(abbreviation) = extract_abbreviation(line) {
        let without_abbreviation = abbreviation_regex()
            .replace_all(&name, "")
            .trim()
            .to_string();
        if without_abbreviation != name {
            spellings.push(without_abbreviation);
        }

        let spaced = abbreviation.replace('-', " ");
        spellings.push(abbreviation.clone());
        if spaced != abbreviation {
            spellings.push(spaced);
        }
    }

    Some(ClassifierGroup::new(spellings))
}

/// Last `::` segment of a classifier.
fn extract_name(classifier: &str) -> String {
    match classifier.split("::").last() {
        Some(last) if last.len() > 1 => last.trim().to_string(),
        _ => String::new(),
    }
}

/// Text between the first `(` and the first `)`.
fn extract_abbreviation(classifier: &str) -> Option<String> {
    let start = classifier.find('(')?;
    let end = classifier.find(')')?;
    (end > start).then(|| classifier[start + 1..end].to_string())
}
