//! Scenario orchestration
//!
//! Submits a migration plan, runs it, waits for the task, and compares the
//! resulting Pulp 3 repositories with counts taken from the legacy store.
//!
//! # Example
//!
//! ```no_run
//! use pulp_migrate_check::api::RunOptions;
//! use pulp_migrate_check::config::Config;
//! use pulp_migrate_check::harness::{MigrationHarness, Scenario};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load("config.yaml")?;
//! let harness = MigrationHarness::from_config(&config)?;
//! for report in harness.run_all(RunOptions::default()).await? {
//!     println!("{:?}: {} repositories", report.scenario, report.repositories.len());
//! }
//! # Ok(())
//! # }
//! ```

mod scenario;

pub use scenario::Scenario;

use crate::api::{
    ApiClient, ApiClientConfig, ApiError, FileContentApi, FileRepositoriesApi,
    FileRepositoryVersionsApi, MigrationPlansApi, RunOptions, TaskState, TasksApi,
};
use crate::config::Config;
use crate::legacy::{FixtureCounts, LegacyError, LegacyStore, SnapshotStore};
use crate::monitor::{MonitorError, TaskMonitor};
use crate::plan::{MigrationPlan, MissingResources, PlanError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Harness errors
///
/// Everything after `InsufficientFixtures` is a failed expectation about the
/// migrated data rather than an infrastructure problem.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error(transparent)]
    Legacy(#[from] LegacyError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Migrated '{0}' repositories cannot be verified, only file repositories are checked")]
    UnverifiablePlugin(String),

    #[error("Need at least {required} legacy repositories, found {found}")]
    InsufficientFixtures { required: usize, found: usize },

    #[error("Plan references resources missing from Pulp 2: {0}")]
    MissingResources(MissingResources),

    #[error(
        "Task {href} ended '{state}', expected 'completed': {}",
        .error.as_deref().unwrap_or("no error reported")
    )]
    TaskNotCompleted {
        href: String,
        state: TaskState,
        error: Option<String>,
    },

    #[error("Missing a Pulp 3 repository for Pulp 2 repository id '{0}'")]
    MissingRepository(String),

    #[error("Pulp 3 repository is named '{actual}', expected '{expected}'")]
    NameMismatch { expected: String, actual: String },

    #[error("Pulp 3 repository {repository_href} for '{repo_id}' has no versions")]
    MissingRepositoryVersion {
        repo_id: String,
        repository_href: String,
    },

    #[error("No legacy content count recorded for '{0}'")]
    UnknownFixture(String),

    #[error("Repository '{repo_id}' has {actual} content units, Pulp 2 had {expected}")]
    ContentCountMismatch {
        repo_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Pulp 3 has {actual} file repositories, expected {expected}")]
    RepositoryCountMismatch { expected: u64, actual: u64 },
}

/// Result of verifying one migrated repository
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryCheck {
    pub repo_id: String,
    pub pulp_href: String,
    pub version_href: String,
    pub content_count: u64,
}

/// Result of one plan run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: Option<Scenario>,
    pub plan_href: String,
    pub task_href: String,
    pub task_state: TaskState,
    /// Server-side run time of the migration task
    pub task_run_time_ms: Option<i64>,
    pub dry_run: bool,
    pub repositories: Vec<RepositoryCheck>,
    pub total_repositories: Option<u64>,
}

/// Drives migration scenarios against a running Pulp 3
pub struct MigrationHarness {
    tasks: TasksApi,
    repositories: FileRepositoriesApi,
    versions: FileRepositoryVersionsApi,
    content: FileContentApi,
    plans: MigrationPlansApi,
    monitor: TaskMonitor,
    store: Arc<dyn LegacyStore>,
    fixtures: FixtureCounts,
    plugin_type: String,
}

impl MigrationHarness {
    /// Create a harness; legacy fixture counts are computed once here
    pub fn new(
        client: ApiClient,
        monitor: TaskMonitor,
        store: Arc<dyn LegacyStore>,
        plugin_type: &str,
    ) -> Self {
        let fixtures = FixtureCounts::collect(store.as_ref(), plugin_type);
        info!(
            plugin = plugin_type,
            repositories = fixtures.len(),
            "Collected Pulp 2 fixture counts"
        );

        Self {
            tasks: TasksApi::new(client.clone()),
            repositories: FileRepositoriesApi::new(client.clone()),
            versions: FileRepositoryVersionsApi::new(client.clone()),
            content: FileContentApi::new(client.clone()),
            plans: MigrationPlansApi::new(client),
            monitor,
            store,
            fixtures,
            plugin_type: plugin_type.to_string(),
        }
    }

    /// Build a harness from configuration, loading the legacy snapshot
    pub fn from_config(config: &Config) -> Result<Self, HarnessError> {
        let client = ApiClient::new(ApiClientConfig::from(&config.pulp))?;
        let store = SnapshotStore::load(&config.legacy.snapshot_dir)?;

        Ok(Self::new(
            client,
            TaskMonitor::from_config(&config.tasks),
            Arc::new(store),
            &config.legacy.plugin,
        ))
    }

    pub fn fixtures(&self) -> &FixtureCounts {
        &self.fixtures
    }

    pub fn plugin_type(&self) -> &str {
        &self.plugin_type
    }

    /// The plan a scenario would submit
    pub fn plan_for(&self, scenario: Scenario) -> Result<MigrationPlan, HarnessError> {
        Ok(scenario.prepare(&self.plugin_type, &self.fixtures)?.0)
    }

    /// Run every scenario in order, stopping at the first failure
    pub async fn run_all(&self, options: RunOptions) -> Result<Vec<ScenarioReport>, HarnessError> {
        let mut reports = Vec::with_capacity(Scenario::ALL.len());
        for scenario in Scenario::ALL {
            reports.push(self.run_scenario(scenario, options).await?);
        }
        Ok(reports)
    }

    /// Run one scenario
    #[tracing::instrument(name = "scenario", skip_all, fields(scenario = %scenario))]
    pub async fn run_scenario(
        &self,
        scenario: Scenario,
        options: RunOptions,
    ) -> Result<ScenarioReport, HarnessError> {
        let result = match scenario.prepare(&self.plugin_type, &self.fixtures) {
            Ok((plan, repos)) => self.do_test(&repos, &plan, options).await,
            Err(e) => Err(e),
        };

        crate::metrics::record_scenario(scenario.as_str(), result.is_ok());
        match &result {
            Ok(_) => info!("Scenario passed"),
            Err(e) => warn!(error = %e, "Scenario failed"),
        }

        result.map(|report| ScenarioReport {
            scenario: Some(scenario),
            ..report
        })
    }

    /// Submit `plan`, run it, and check that exactly `repos` were migrated
    /// with the legacy content counts
    pub async fn do_test(
        &self,
        repos: &[String],
        plan: &MigrationPlan,
        options: RunOptions,
    ) -> Result<ScenarioReport, HarnessError> {
        if !crate::plugins::is_verifiable(&self.plugin_type) {
            return Err(HarnessError::UnverifiablePlugin(self.plugin_type.clone()));
        }
        plan.validate()?;

        if options.validate {
            let missing = plan.missing_resources(self.store.as_ref());
            if !missing.is_empty() {
                return Err(HarnessError::MissingResources(missing));
            }
        }

        let created = self.plans.create(plan).await?;
        info!(plan_href = %created.pulp_href, "Created migration plan");

        let operation = self.plans.run(&created.pulp_href, options).await?;
        info!(task_href = %operation.task, "Migration started");

        let task = self.monitor.wait(&self.tasks, &operation.task).await?;
        if task.state != TaskState::Completed {
            return Err(HarnessError::TaskNotCompleted {
                href: task.pulp_href.clone(),
                error: task.error_description().map(str::to_string),
                state: task.state,
            });
        }

        let mut report = ScenarioReport {
            scenario: None,
            plan_href: created.pulp_href,
            task_run_time_ms: task.run_time().map(|d| d.num_milliseconds()),
            task_href: task.pulp_href,
            task_state: task.state,
            dry_run: options.dry_run,
            repositories: Vec::with_capacity(repos.len()),
            total_repositories: None,
        };

        if options.dry_run {
            return Ok(report);
        }

        for repo_id in repos {
            report.repositories.push(self.check_repository(repo_id).await?);
        }

        let total = self.repositories.list(None).await?.count;
        if total != repos.len() as u64 {
            return Err(HarnessError::RepositoryCountMismatch {
                expected: repos.len() as u64,
                actual: total,
            });
        }
        report.total_repositories = Some(total);

        Ok(report)
    }

    async fn check_repository(&self, repo_id: &str) -> Result<RepositoryCheck, HarnessError> {
        let page = self.repositories.list(Some(repo_id)).await?;
        let repository = page
            .results
            .into_iter()
            .next()
            .ok_or_else(|| HarnessError::MissingRepository(repo_id.to_string()))?;

        if repository.name != repo_id {
            return Err(HarnessError::NameMismatch {
                expected: repo_id.to_string(),
                actual: repository.name,
            });
        }

        let version = self
            .versions
            .list(&repository.pulp_href)
            .await?
            .results
            .into_iter()
            .next()
            .ok_or_else(|| HarnessError::MissingRepositoryVersion {
                repo_id: repo_id.to_string(),
                repository_href: repository.pulp_href.clone(),
            })?;

        let expected = self
            .fixtures
            .get(repo_id)
            .ok_or_else(|| HarnessError::UnknownFixture(repo_id.to_string()))?;
        let actual = self.content.list(&version.pulp_href).await?.count;

        if expected != actual {
            return Err(HarnessError::ContentCountMismatch {
                repo_id: repo_id.to_string(),
                expected,
                actual,
            });
        }

        tracing::debug!(repo_id, content_count = actual, "Repository verified");

        Ok(RepositoryCheck {
            repo_id: repo_id.to_string(),
            pulp_href: repository.pulp_href,
            version_href: version.pulp_href,
            content_count: actual,
        })
    }
}
