//! Core task resources

use super::{ApiClient, ApiError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskState {
    Waiting,
    Skipped,
    Running,
    Completed,
    Failed,
    Canceled,
    Canceling,
    Unknown(String),
}

impl TaskState {
    /// Whether the task will not change state again
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Canceled | TaskState::Skipped
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskState::Waiting => "waiting",
            TaskState::Skipped => "skipped",
            TaskState::Running => "running",
            TaskState::Completed => "completed",
            TaskState::Failed => "failed",
            TaskState::Canceled => "canceled",
            TaskState::Canceling => "canceling",
            TaskState::Unknown(other) => other,
        }
    }
}

impl From<String> for TaskState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "waiting" => TaskState::Waiting,
            "skipped" => TaskState::Skipped,
            "running" => TaskState::Running,
            "completed" => TaskState::Completed,
            "failed" => TaskState::Failed,
            "canceled" => TaskState::Canceled,
            "canceling" => TaskState::Canceling,
            _ => TaskState::Unknown(state),
        }
    }
}

impl From<TaskState> for String {
    fn from(state: TaskState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error reported by a failed task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskError {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub traceback: Option<String>,
}

/// An asynchronous task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub pulp_href: String,
    #[serde(default)]
    pub name: Option<String>,
    pub state: TaskState,
    #[serde(default)]
    pub pulp_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<TaskError>,
    #[serde(default)]
    pub created_resources: Vec<String>,
}

impl Task {
    /// Short description of why the task did not complete
    pub fn error_description(&self) -> Option<&str> {
        self.error.as_ref()?.description.as_deref()
    }

    /// Wall-clock run time, once the task has started and finished
    pub fn run_time(&self) -> Option<chrono::Duration> {
        Some(self.finished_at? - self.started_at?)
    }
}

/// Tasks API (`/pulp/api/v3/tasks/`)
#[derive(Debug, Clone)]
pub struct TasksApi {
    client: ApiClient,
}

impl TasksApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Read a task by href
    pub async fn read(&self, task_href: &str) -> Result<Task, ApiError> {
        let url = self.client.url(task_href);
        self.client.get("tasks", &url, &[]).await
    }
}
