//! Migration plan documents
//!
//! A migration plan tells the migration service which Pulp 2 repositories to
//! migrate and how to map them onto Pulp 3 repositories.
//!
//! # Example
//!
//! ```
//! use pulp_migrate_check::plan::{MigrationPlan, PluginPlan, RepositoryPlan};
//!
//! // Mirror every ISO repository
//! let plan = MigrationPlan::mirror_all("iso");
//! assert_eq!(plan.to_json().unwrap(), r#"{"plugins":[{"type":"iso"}]}"#);
//!
//! // Migrate a single repository, pinning its importer and distributor
//! let plan = MigrationPlan::new(vec![
//!     PluginPlan::new("iso").with_repository(RepositoryPlan::identity("file")),
//! ]);
//! assert!(plan.validate().is_ok());
//! ```

mod missing;

pub use missing::MissingResources;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Plan errors
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Invalid migration plan: {0}")]
    Invalid(String),

    #[error("Failed to (de)serialize migration plan: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level migration plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub plugins: Vec<PluginPlan>,
}

/// Per-plugin section of a plan
///
/// An empty `repositories` list is omitted on the wire and means "migrate
/// every legacy repository of this type".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginPlan {
    #[serde(rename = "type")]
    pub plugin_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<RepositoryPlan>,
}

/// A Pulp 3 repository to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryPlan {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulp2_importer_repository_id: Option<String>,
    #[serde(default)]
    pub repository_versions: Vec<RepositoryVersionPlan>,
}

/// A Pulp 3 repository version built from one Pulp 2 repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryVersionPlan {
    pub pulp2_repository_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pulp2_distributor_repository_ids: Vec<String>,
}

impl MigrationPlan {
    pub fn new(plugins: Vec<PluginPlan>) -> Self {
        Self { plugins }
    }

    /// Plan migrating every legacy repository of one plugin type
    pub fn mirror_all(plugin_type: &str) -> Self {
        Self::new(vec![PluginPlan::new(plugin_type)])
    }

    /// Parse and validate a plan
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        let plan: Self = serde_json::from_str(json)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Compact JSON form, as submitted to the service
    pub fn to_json(&self) -> Result<String, PlanError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn plugin(&self, plugin_type: &str) -> Option<&PluginPlan> {
        self.plugins.iter().find(|p| p.plugin_type == plugin_type)
    }

    /// Pulp 2 repository ids explicitly referenced for a plugin
    pub fn repository_ids(&self, plugin_type: &str) -> Vec<String> {
        self.plugin(plugin_type)
            .map(PluginPlan::repository_ids)
            .unwrap_or_default()
    }

    /// Check the plan's structure before submitting it
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.plugins.is_empty() {
            return Err(PlanError::Invalid("at least one plugin is required".into()));
        }

        let mut seen_types = HashSet::new();
        for plugin in &self.plugins {
            if crate::plugins::content_types(&plugin.plugin_type).is_none() {
                return Err(PlanError::Invalid(format!(
                    "unsupported plugin type '{}'",
                    plugin.plugin_type
                )));
            }
            if !seen_types.insert(plugin.plugin_type.as_str()) {
                return Err(PlanError::Invalid(format!(
                    "plugin type '{}' appears more than once",
                    plugin.plugin_type
                )));
            }
            plugin.validate()?;
        }

        Ok(())
    }
}

impl PluginPlan {
    pub fn new(plugin_type: &str) -> Self {
        Self {
            plugin_type: plugin_type.to_string(),
            repositories: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_repository(mut self, repository: RepositoryPlan) -> Self {
        self.repositories.push(repository);
        self
    }

    /// True when the plugin migrates everything of its type
    pub fn is_mirror_all(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Distinct Pulp 2 repository ids, in plan order
    pub fn repository_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for version in self.repositories.iter().flat_map(|r| &r.repository_versions) {
            if !ids.contains(&version.pulp2_repository_id) {
                ids.push(version.pulp2_repository_id.clone());
            }
        }
        ids
    }

    fn validate(&self) -> Result<(), PlanError> {
        let mut names = HashSet::new();
        for repository in &self.repositories {
            if repository.name.trim().is_empty() {
                return Err(PlanError::Invalid(format!(
                    "repository name cannot be empty (plugin '{}')",
                    self.plugin_type
                )));
            }
            if !names.insert(repository.name.as_str()) {
                return Err(PlanError::Invalid(format!(
                    "duplicate repository name '{}'",
                    repository.name
                )));
            }
            if repository.repository_versions.is_empty() {
                return Err(PlanError::Invalid(format!(
                    "repository '{}' has no repository_versions",
                    repository.name
                )));
            }
            if repository
                .repository_versions
                .iter()
                .any(|v| v.pulp2_repository_id.trim().is_empty())
            {
                return Err(PlanError::Invalid(format!(
                    "repository '{}' has an empty pulp2_repository_id",
                    repository.name
                )));
            }
        }
        Ok(())
    }
}

impl RepositoryPlan {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pulp2_importer_repository_id: None,
            repository_versions: Vec::new(),
        }
    }

    /// Repository named after a Pulp 2 repository that supplies its own
    /// importer, content and distributor
    pub fn identity(repo_id: &str) -> Self {
        Self::new(repo_id)
            .importer(repo_id)
            .version(RepositoryVersionPlan::new(repo_id).distributors([repo_id]))
    }

    #[must_use]
    pub fn importer(mut self, pulp2_repo_id: &str) -> Self {
        self.pulp2_importer_repository_id = Some(pulp2_repo_id.to_string());
        self
    }

    #[must_use]
    pub fn version(mut self, version: RepositoryVersionPlan) -> Self {
        self.repository_versions.push(version);
        self
    }
}

impl RepositoryVersionPlan {
    pub fn new(pulp2_repo_id: &str) -> Self {
        Self {
            pulp2_repository_id: pulp2_repo_id.to_string(),
            pulp2_distributor_repository_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn distributors<I, S>(mut self, repo_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pulp2_distributor_repository_ids
            .extend(repo_ids.into_iter().map(Into::into));
        self
    }
}
