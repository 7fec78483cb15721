//! Task Monitor Integration Tests
//!
//! Polls a mock tasks endpoint through the real HTTP client.

mod common;

use common::{MockPulp, TASK_HREF};
use pulp_migrate_check::api::{ApiClient, ApiClientConfig, TaskState, TasksApi};
use pulp_migrate_check::monitor::{MonitorError, TaskMonitor};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn tasks_api(pulp: &MockPulp) -> TasksApi {
    TasksApi::new(ApiClient::new(ApiClientConfig::new(&pulp.uri(), "admin", "password")).unwrap())
}

#[tokio::test]
async fn test_polls_until_completed() {
    let pulp = MockPulp::start().await;
    pulp.task_states(&["waiting", "running", "running", "completed"]).await;

    let task = common::test_monitor()
        .wait(&tasks_api(&pulp), TASK_HREF)
        .await
        .unwrap();

    assert_eq!(task.state, TaskState::Completed);
    let requests = pulp.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn test_returns_failed_task_with_error() {
    let pulp = MockPulp::start().await;
    pulp.task_failed("Pulp 2 repository 'file' not found").await;

    let task = common::test_monitor()
        .wait(&tasks_api(&pulp), TASK_HREF)
        .await
        .unwrap();

    assert_eq!(task.state, TaskState::Failed);
    assert_eq!(task.error_description(), Some("Pulp 2 repository 'file' not found"));
}

#[tokio::test]
async fn test_times_out_on_stuck_task() {
    let pulp = MockPulp::start().await;
    pulp.task_states(&["running"]).await;

    let monitor = TaskMonitor::new(Duration::from_millis(10), Duration::from_millis(60));
    let err = monitor.wait(&tasks_api(&pulp), TASK_HREF).await.unwrap_err();

    assert!(matches!(err, MonitorError::Timeout { .. }));
    assert!(err.to_string().contains("running"));
}

#[tokio::test]
async fn test_missing_task_is_api_error() {
    let pulp = MockPulp::start().await;
    Mock::given(method("GET"))
        .and(path(TASK_HREF))
        .respond_with(ResponseTemplate::new(404).set_body_string("{\"detail\": \"Not found.\"}"))
        .mount(&pulp.server)
        .await;

    let err = common::test_monitor()
        .wait(&tasks_api(&pulp), TASK_HREF)
        .await
        .unwrap_err();

    match err {
        MonitorError::Api(api) => assert_eq!(api.status(), Some(404)),
        other => panic!("Expected API error, got {other:?}"),
    }
}
