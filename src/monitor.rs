//! Task monitoring
//!
//! Blocks on an asynchronous Pulp task until it reaches a terminal state.
//! The terminal task is returned as-is; deciding whether `failed` or
//! `canceled` is an error is up to the caller.

use crate::api::{ApiError, Task, TaskState, TasksApi};
use crate::config::TaskConfig;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};

/// Monitor errors
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to read task: {0}")]
    Api(#[from] ApiError),

    #[error("Task {href} still '{last_state}' after {waited:?}")]
    Timeout {
        href: String,
        waited: Duration,
        last_state: TaskState,
    },
}

/// Source of task status
#[async_trait]
pub trait TaskReader: Send + Sync {
    async fn read_task(&self, task_href: &str) -> Result<Task, ApiError>;
}

#[async_trait]
impl TaskReader for TasksApi {
    async fn read_task(&self, task_href: &str) -> Result<Task, ApiError> {
        self.read(task_href).await
    }
}

/// Polls a task until it is terminal or a deadline passes
#[derive(Debug, Clone, Copy)]
pub struct TaskMonitor {
    poll_interval: Duration,
    timeout: Duration,
}

impl TaskMonitor {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }

    pub fn from_config(config: &TaskConfig) -> Self {
        Self::new(config.poll_interval(), config.timeout())
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait for a task to reach a terminal state
    #[tracing::instrument(
        name = "task.wait",
        skip(self, reader),
        fields(
            task.href = %task_href,
            task.state = tracing::field::Empty,
            task.polls = tracing::field::Empty
        ),
        err
    )]
    pub async fn wait(
        &self,
        reader: &dyn TaskReader,
        task_href: &str,
    ) -> Result<Task, MonitorError> {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut polls: u64 = 0;

        loop {
            let task = reader.read_task(task_href).await?;
            polls += 1;
            crate::metrics::record_task_poll();
            debug!(state = %task.state, polls, "Task status");

            if task.state.is_terminal() {
                let waited = started.elapsed();
                crate::metrics::record_task_wait(waited.as_secs_f64());

                let span = tracing::Span::current();
                span.record("task.state", task.state.as_str());
                span.record("task.polls", polls);

                info!(
                    state = %task.state,
                    waited_ms = waited.as_millis() as u64,
                    run_time_ms = task.run_time().map(|d| d.num_milliseconds()),
                    "Task reached terminal state"
                );
                return Ok(task);
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(MonitorError::Timeout {
                    href: task_href.to_string(),
                    waited: now - started,
                    last_state: task.state,
                });
            }

            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}
