use std::path::{Path, PathBuf};

use tracing::debug;

use super::{MetadataRecord, MetadataSource, Observation};
use crate::error::{Result, SolverError};

/// Explicit list of metadata JSON files, read in the given order.
pub struct FileSource {
    paths: Vec<PathBuf>,
}

impl FileSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl MetadataSource for FileSource {
    fn observations(&self) -> Result<Vec<Observation>> {
        Ok(self.paths.iter().map(|p| read_observation(p)).collect())
    }
}

/// Every regular file directly inside a directory, sorted by file name.
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl MetadataSource for DirectorySource {
    fn observations(&self) -> Result<Vec<Observation>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_file() {
                files.push(path);
            } else {
                debug!(path = %path.display(), "subdirectory skipped");
            }
        }
        files.sort();

        Ok(files.iter().map(|p| read_observation(p)).collect())
    }
}

fn read_observation(path: &Path) -> Observation {
    Observation {
        source: path.display().to_string(),
        record: read_metadata_file(path),
    }
}

/// Read and extract one metadata JSON file.
pub fn read_metadata_file(path: &Path) -> Result<MetadataRecord> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        return Err(SolverError::NotJson(path.to_path_buf()));
    }

    let name = path.display().to_string();
    let content =
        std::fs::read_to_string(path).map_err(|e| SolverError::malformed(&name, e.to_string()))?;
    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| SolverError::malformed(&name, e.to_string()))?;
    debug!(path = %name, "loaded metadata file");
    MetadataRecord::from_json(&value, &name)
}
