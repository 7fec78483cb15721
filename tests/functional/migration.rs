//! Live migration scenarios
//!
//! Migrations on the server accumulate, so the scenarios only make sense in
//! order and within one test. Tests share the server and run serially.

use super::common::live_harness;
use pulp_migrate_check::api::{RunOptions, TaskState};
use pulp_migrate_check::harness::Scenario;

/// Test: every scenario migrates and matches the Pulp 2 content counts
#[tokio::test]
#[serial_test::serial]
async fn test_file_migration_scenarios() {
    let Some(harness) = live_harness().await else {
        return;
    };
    assert!(
        harness.fixtures().len() >= 2,
        "Pulp 2 export needs at least two {} repositories",
        harness.plugin_type()
    );

    let reports = harness
        .run_all(RunOptions::default())
        .await
        .expect("Migration scenarios failed");

    assert_eq!(reports.len(), Scenario::ALL.len());
    for report in &reports {
        assert_eq!(report.task_state, TaskState::Completed);
        for check in &report.repositories {
            assert_eq!(
                Some(check.content_count),
                harness.fixtures().get(&check.repo_id),
                "Content count for {}",
                check.repo_id
            );
        }
    }
}

/// Test: a validating dry run completes without checking repositories
#[tokio::test]
#[serial_test::serial]
async fn test_validate_dry_run() {
    let Some(harness) = live_harness().await else {
        return;
    };

    let options = RunOptions {
        validate: true,
        dry_run: true,
    };
    let report = harness
        .run_scenario(Scenario::MirrorAll, options)
        .await
        .expect("Dry run failed");

    assert!(report.dry_run);
    assert!(report.repositories.is_empty());
    assert_eq!(report.total_repositories, None);
}
