//! Cross-checking a plan against the legacy store

use super::MigrationPlan;
use crate::legacy::LegacyStore;
use serde::Serialize;
use std::fmt;

/// Legacy resources a plan refers to that the legacy store does not have
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MissingResources {
    pub repositories: Vec<String>,
    pub importers: Vec<String>,
    pub distributors: Vec<String>,
}

impl MissingResources {
    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty() && self.importers.is_empty() && self.distributors.is_empty()
    }
}

impl fmt::Display for MissingResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for (kind, ids) in [
            ("repositories", &self.repositories),
            ("importers", &self.importers),
            ("distributors", &self.distributors),
        ] {
            if !ids.is_empty() {
                parts.push(format!("{}: [{}]", kind, ids.join(", ")));
            }
        }
        write!(f, "{}", parts.join("; "))
    }
}

fn push_unique(ids: &mut Vec<String>, id: &str) {
    if !ids.iter().any(|known| known == id) {
        ids.push(id.to_string());
    }
}

impl MigrationPlan {
    /// Referenced legacy ids that the store cannot resolve
    ///
    /// Importers and distributors are attached to Pulp 2 repositories, so
    /// each is resolved through its owning repository id.
    pub fn missing_resources(&self, store: &dyn LegacyStore) -> MissingResources {
        let mut missing = MissingResources::default();

        for repository in self.plugins.iter().flat_map(|p| &p.repositories) {
            if let Some(importer) = &repository.pulp2_importer_repository_id {
                if !store.has_repository(importer) {
                    push_unique(&mut missing.importers, importer);
                }
            }
            for version in &repository.repository_versions {
                if !store.has_repository(&version.pulp2_repository_id) {
                    push_unique(&mut missing.repositories, &version.pulp2_repository_id);
                }
                for distributor in &version.pulp2_distributor_repository_ids {
                    if !store.has_repository(distributor) {
                        push_unique(&mut missing.distributors, distributor);
                    }
                }
            }
        }

        missing
    }
}
