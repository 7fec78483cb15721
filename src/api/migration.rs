//! Migration plan resources

use super::{ApiClient, ApiError};
use crate::plan::MigrationPlan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Flags accepted by the plan `run/` action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Refuse to migrate when the plan references missing legacy resources
    #[serde(default)]
    pub validate: bool,
    /// Validate only; migrate nothing
    #[serde(default)]
    pub dry_run: bool,
}

/// A stored migration plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationPlanResponse {
    pub pulp_href: String,
    #[serde(default)]
    pub pulp_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub plan: serde_json::Value,
}

/// Response of an action that spawned a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsyncOperationResponse {
    pub task: String,
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    plan: &'a MigrationPlan,
}

/// Migration plans API (`migration-plans/`)
#[derive(Debug, Clone)]
pub struct MigrationPlansApi {
    client: ApiClient,
}

impl MigrationPlansApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Store a plan
    pub async fn create(&self, plan: &MigrationPlan) -> Result<MigrationPlanResponse, ApiError> {
        let url = self.client.endpoint("migration-plans/");
        self.client
            .post("migration_plans", &url, &CreateRequest { plan })
            .await
    }

    /// Start migrating a stored plan
    pub async fn run(
        &self,
        plan_href: &str,
        options: RunOptions,
    ) -> Result<AsyncOperationResponse, ApiError> {
        let href = format!("{}/run/", plan_href.trim_end_matches('/'));
        let url = self.client.url(&href);
        self.client.post("migration_plans", &url, &options).await
    }
}
