//! Expected values derived from the legacy store

use super::{ContentUnitAssociation, LegacyStore};
use crate::plan::MigrationPlan;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Classification of legacy repositories by plugin type
///
/// Repositories named in the plan take that plugin's type. Every other
/// repository takes the type of its first content unit whose content type
/// belongs to one of the plan's plugins.
#[derive(Debug, Clone, Default)]
pub struct RepoTypeIndex {
    repo_id_to_type: HashMap<String, String>,
}

impl RepoTypeIndex {
    pub fn build(plan: &MigrationPlan, units: &[ContentUnitAssociation]) -> Self {
        let mut index = Self::default();

        for plugin in &plan.plugins {
            for repo_id in plugin.repository_ids() {
                index
                    .repo_id_to_type
                    .insert(repo_id, plugin.plugin_type.clone());
            }
        }

        for unit in units {
            if index.repo_id_to_type.contains_key(&unit.repo_id) {
                continue;
            }
            let Some(plugin) = crate::plugins::plugin_for_content_type(&unit.unit_type_id)
                .filter(|plugin| plan.plugin(plugin).is_some())
            else {
                continue;
            };
            index
                .repo_id_to_type
                .insert(unit.repo_id.clone(), plugin.to_string());
        }

        index
    }

    pub fn repo_type(&self, repo_id: &str) -> Option<&str> {
        self.repo_id_to_type.get(repo_id).map(String::as_str)
    }
}

/// Legacy repository id -> number of associated content units
///
/// Keeps the legacy store's repository order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureCounts {
    entries: Vec<(String, u64)>,
}

impl FixtureCounts {
    /// Counts for every legacy repository of one plugin type
    ///
    /// A repository's type comes from its `_repo-type` note; repositories
    /// without the note are classified by the content they hold.
    pub fn collect(store: &dyn LegacyStore, plugin_type: &str) -> Self {
        let plan = MigrationPlan::mirror_all(plugin_type);
        let index = RepoTypeIndex::build(&plan, store.content_units());

        let entries = store
            .repositories()
            .iter()
            .filter(|repo| match repo.repo_type() {
                Some(repo_type) => repo_type == plugin_type,
                None => index.repo_type(&repo.repo_id) == Some(plugin_type),
            })
            .map(|repo| (repo.repo_id.clone(), store.content_unit_count(&repo.repo_id)))
            .collect();

        Self { entries }
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(|(id, n)| (id.into(), n)).collect(),
        }
    }

    pub fn get(&self, repo_id: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(id, _)| id == repo_id)
            .map(|(_, count)| *count)
    }

    pub fn repo_ids(&self) -> Vec<String> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FixtureCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (repo_id, count) in &self.entries {
            map.serialize_entry(repo_id, count)?;
        }
        map.end()
    }
}
