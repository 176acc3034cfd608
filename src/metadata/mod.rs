//! Package metadata extraction.
//!
//! A [`MetadataRecord`] carries the four fields the resolvers need. Records
//! come from a [`MetadataSource`]: explicit files, a directory ([`files`]), or
//! the PyPI JSON API ([`crate::registry::pypi`]).

pub mod files;

use serde_json::{Map, Value};

use crate::error::{Result, SolverError};

/// Raw fields extracted from one metadata document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    pub package_name: Option<String>,
    pub package_version: Option<String>,
    pub license: Option<String>,
    pub classifiers: Option<Vec<String>>,
}

impl MetadataRecord {
    /// Extract fields from a metadata JSON object.
    ///
    /// Accepts both the flat `importlib.metadata` layout (`Name`, `Version`,
    /// `License`, `Classifier`) and PyPI JSON API responses (fields under `info`).
    pub fn from_json(value: &Value, source_name: &str) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(SolverError::malformed(source_name, "expected a JSON object"));
        };
        let object = match object.get("info").and_then(Value::as_object) {
            Some(info) => info,
            None => object,
        };

        let license = string_field(object, "License", "license")
            .filter(|license| !license.trim().is_empty());

        Ok(Self {
            package_name: string_field(object, "Name", "name"),
            package_version: string_field(object, "Version", "version"),
            license,
            classifiers: classifier_field(object),
        })
    }
}

/// Value under `primary`, or under `fallback` when `primary` is missing or falsy.
fn lookup<'a>(object: &'a Map<String, Value>, primary: &str, fallback: &str) -> Option<&'a Value> {
    match object.get(primary) {
        Some(value) if is_truthy(value) => Some(value),
        _ => object.get(fallback),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    }
}

fn string_field(object: &Map<String, Value>, primary: &str, fallback: &str) -> Option<String> {
    lookup(object, primary, fallback)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn classifier_field(object: &Map<String, Value>) -> Option<Vec<String>> {
    let values = lookup(object, "Classifier", "classifiers")?.as_array()?;
    Some(
        values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

/// One metadata document and where it came from.
#[derive(Debug)]
pub struct Observation {
    pub source: String,
    pub record: Result<MetadataRecord>,
}

/// Something that yields metadata records in a stable order.
///
/// An `Err` from [`MetadataSource::observations`] means the source as a whole
/// could not be listed; per-record failures are carried inside each
/// [`Observation`].
pub trait MetadataSource {
    fn observations(&self) -> Result<Vec<Observation>>;
}
