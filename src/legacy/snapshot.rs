//! Snapshot-backed legacy store
//!
//! Loads the Pulp 2 collections from a `mongoexport` dump directory:
//!
//! ```text
//! export/
//!   repos.json               # mongoexport --collection repos
//!   repo_content_units.json  # mongoexport --collection repo_content_units
//! ```
//!
//! Each file may hold one JSON document per line (the `mongoexport`
//! default) or a single JSON array (`--jsonArray`).

use super::{ContentUnitAssociation, LegacyError, LegacyRepository, LegacyStore};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

pub const REPOSITORIES_FILE: &str = "repos.json";
pub const CONTENT_UNITS_FILE: &str = "repo_content_units.json";

/// Legacy store held in memory
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    repositories: Vec<LegacyRepository>,
    content_units: Vec<ContentUnitAssociation>,
    counts: HashMap<String, u64>,
}

impl SnapshotStore {
    /// Load a snapshot directory
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, LegacyError> {
        let dir = dir.as_ref();
        let repositories: Vec<LegacyRepository> = read_collection(&dir.join(REPOSITORIES_FILE))?;
        let content_units: Vec<ContentUnitAssociation> =
            read_collection(&dir.join(CONTENT_UNITS_FILE))?;

        info!(
            dir = %dir.display(),
            repositories = repositories.len(),
            content_units = content_units.len(),
            "Loaded Pulp 2 snapshot"
        );

        Ok(Self::from_parts(repositories, content_units))
    }

    pub fn from_parts(
        repositories: Vec<LegacyRepository>,
        content_units: Vec<ContentUnitAssociation>,
    ) -> Self {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for unit in &content_units {
            *counts.entry(unit.repo_id.clone()).or_default() += 1;
        }

        Self {
            repositories,
            content_units,
            counts,
        }
    }
}

impl LegacyStore for SnapshotStore {
    fn repositories(&self) -> &[LegacyRepository] {
        &self.repositories
    }

    fn content_units(&self) -> &[ContentUnitAssociation] {
        &self.content_units
    }

    fn content_unit_count(&self, repo_id: &str) -> u64 {
        self.counts.get(repo_id).copied().unwrap_or(0)
    }
}

fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LegacyError> {
    let content = std::fs::read_to_string(path).map_err(|source| LegacyError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if content.trim_start().starts_with('[') {
        debug!(path = %path.display(), "Reading JSON array export");
        return serde_json::from_str(&content).map_err(|source| LegacyError::Parse {
            path: path.to_path_buf(),
            line: source.line(),
            source,
        });
    }

    debug!(path = %path.display(), "Reading line-delimited export");
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| LegacyError::Parse {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })
        })
        .collect()
}
