//! Legacy (Pulp 2) oracle
//!
//! Reads repository and content-association records from the Pulp 2 store
//! and turns them into the expected values the harness checks the migrated
//! Pulp 3 data against.

mod fixtures;
mod snapshot;

pub use fixtures::{FixtureCounts, RepoTypeIndex};
pub use snapshot::SnapshotStore;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Note key under which Pulp 2 records a repository's type, e.g. `iso-repo`
pub const REPO_TYPE_NOTE: &str = "_repo-type";

/// Legacy store errors
#[derive(Error, Debug)]
pub enum LegacyError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path} (line {line}): {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// A Pulp 2 repository record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyRepository {
    pub repo_id: String,
    #[serde(default)]
    pub notes: HashMap<String, serde_json::Value>,
}

impl LegacyRepository {
    pub fn new(repo_id: &str) -> Self {
        Self {
            repo_id: repo_id.to_string(),
            notes: HashMap::new(),
        }
    }

    /// Repository carrying a `_repo-type` note such as `iso-repo`
    pub fn with_type(repo_id: &str, repo_type_note: &str) -> Self {
        let mut repo = Self::new(repo_id);
        repo.notes.insert(
            REPO_TYPE_NOTE.to_string(),
            serde_json::Value::String(repo_type_note.to_string()),
        );
        repo
    }

    /// Plugin type recorded in the notes, with the `-repo` suffix removed
    pub fn repo_type(&self) -> Option<&str> {
        let note = self.notes.get(REPO_TYPE_NOTE)?.as_str()?;
        Some(note.strip_suffix("-repo").unwrap_or(note))
    }
}

/// A Pulp 2 repository-to-content-unit association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentUnitAssociation {
    pub repo_id: String,
    #[serde(default)]
    pub unit_id: String,
    pub unit_type_id: String,
}

impl ContentUnitAssociation {
    pub fn new(repo_id: &str, unit_id: &str, unit_type_id: &str) -> Self {
        Self {
            repo_id: repo_id.to_string(),
            unit_id: unit_id.to_string(),
            unit_type_id: unit_type_id.to_string(),
        }
    }
}

/// Read access to legacy records
pub trait LegacyStore: Send + Sync {
    /// Repositories in the store's natural order
    fn repositories(&self) -> &[LegacyRepository];

    /// All content associations
    fn content_units(&self) -> &[ContentUnitAssociation];

    /// Number of content units associated with a repository
    fn content_unit_count(&self, repo_id: &str) -> u64 {
        self.content_units()
            .iter()
            .filter(|unit| unit.repo_id == repo_id)
            .count() as u64
    }

    fn has_repository(&self, repo_id: &str) -> bool {
        self.repositories().iter().any(|repo| repo.repo_id == repo_id)
    }
}
