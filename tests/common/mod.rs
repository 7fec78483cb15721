//! Shared test infrastructure
//!
//! - A wiremock stand-in for the Pulp 3 REST API
//! - Writers for Pulp 2 `mongoexport` snapshots
//! - Harness construction against both

#![allow(dead_code)]

use pulp_migrate_check::api::{ApiClient, ApiClientConfig};
use pulp_migrate_check::harness::MigrationHarness;
use pulp_migrate_check::legacy::SnapshotStore;
use pulp_migrate_check::monitor::TaskMonitor;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_ROOT: &str = "/pulp/api/v3/";
pub const PLAN_HREF: &str = "/pulp/api/v3/migration-plans/7a1c/";
pub const TASK_HREF: &str = "/pulp/api/v3/tasks/5e2d/";
pub const REPOSITORIES_PATH: &str = "/pulp/api/v3/repositories/file/file/";
pub const CONTENT_PATH: &str = "/pulp/api/v3/content/file/files/";

pub fn repository_href(name: &str) -> String {
    format!("{}{}/", REPOSITORIES_PATH, name)
}

pub fn version_href(name: &str, number: u64) -> String {
    format!("{}versions/{}/", repository_href(name), number)
}

/// Task document; terminal states carry a finish time 3.5 s after the start
pub fn task_body(state: &str) -> serde_json::Value {
    let finished_at = match state {
        "completed" | "failed" | "canceled" | "skipped" => json!("2020-03-02T12:00:04.500000Z"),
        _ => serde_json::Value::Null,
    };
    json!({
        "pulp_href": TASK_HREF,
        "name": "pulp_2to3_migration.app.tasks.migrate.migrate_from_pulp2",
        "state": state,
        "pulp_created": "2020-03-02T12:00:00.000000Z",
        "started_at": "2020-03-02T12:00:01.000000Z",
        "finished_at": finished_at,
        "error": null,
        "created_resources": []
    })
}

pub fn page(count: u64, results: Vec<serde_json::Value>) -> serde_json::Value {
    json!({"count": count, "next": null, "previous": null, "results": results})
}

/// Mock Pulp 3 server
pub struct MockPulp {
    pub server: MockServer,
}

impl MockPulp {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Accept plan creation and return a task from `run/`
    pub async fn accept_plan(&self) {
        Mock::given(method("POST"))
            .and(path("/pulp/api/v3/migration-plans/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "pulp_href": PLAN_HREF,
                "pulp_created": "2020-03-02T12:00:00.000000Z",
                "plan": {}
            })))
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path(format!("{}run/", PLAN_HREF)))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"task": TASK_HREF})))
            .mount(&self.server)
            .await;
    }

    /// Serve the task in each of `states` once, then the last one forever
    pub async fn task_states(&self, states: &[&str]) {
        let Some((last, leading)) = states.split_last() else {
            return;
        };
        for state in leading {
            Mock::given(method("GET"))
                .and(path(TASK_HREF))
                .respond_with(ResponseTemplate::new(200).set_body_json(task_body(state)))
                .up_to_n_times(1)
                .mount(&self.server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path(TASK_HREF))
            .respond_with(ResponseTemplate::new(200).set_body_json(task_body(last)))
            .mount(&self.server)
            .await;
    }

    pub async fn task_failed(&self, description: &str) {
        let mut body = task_body("failed");
        body["error"] = json!({"description": description, "traceback": "Traceback ..."});
        Mock::given(method("GET"))
            .and(path(TASK_HREF))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// A migrated repository whose latest version holds `content_count` units
    pub async fn repository(&self, name: &str, content_count: u64) {
        self.repository_named(name, name, content_count).await;
    }

    /// A repository found by the `name` filter but reporting `actual_name`
    pub async fn repository_named(&self, name: &str, actual_name: &str, content_count: u64) {
        let href = repository_href(name);
        let latest = version_href(name, 1);

        Mock::given(method("GET"))
            .and(path(REPOSITORIES_PATH))
            .and(query_param("name", name))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(
                1,
                vec![json!({
                    "pulp_href": href,
                    "name": actual_name,
                    "description": null,
                    "latest_version_href": latest,
                    "versions_href": format!("{}versions/", href)
                })],
            )))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{}versions/", href)))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(
                2,
                vec![
                    json!({"pulp_href": latest, "number": 1, "base_version": null}),
                    json!({"pulp_href": version_href(name, 0), "number": 0, "base_version": null}),
                ],
            )))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(CONTENT_PATH))
            .and(query_param("repository_version", latest.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(content_count, vec![])))
            .mount(&self.server)
            .await;
    }

    /// A repository that exists but has no versions
    pub async fn repository_without_versions(&self, name: &str) {
        let href = repository_href(name);

        Mock::given(method("GET"))
            .and(path(REPOSITORIES_PATH))
            .and(query_param("name", name))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(
                1,
                vec![json!({
                    "pulp_href": href,
                    "name": name,
                    "latest_version_href": null,
                    "versions_href": format!("{}versions/", href)
                })],
            )))
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{}versions/", href)))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(0, vec![])))
            .mount(&self.server)
            .await;
    }

    pub async fn missing_repository(&self, name: &str) {
        Mock::given(method("GET"))
            .and(path(REPOSITORIES_PATH))
            .and(query_param("name", name))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(0, vec![])))
            .mount(&self.server)
            .await;
    }

    /// Unfiltered repository listing
    pub async fn total_repositories(&self, count: u64) {
        Mock::given(method("GET"))
            .and(path(REPOSITORIES_PATH))
            .and(query_param_is_missing("name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(count, vec![])))
            .mount(&self.server)
            .await;
    }
}

/// Write a Pulp 2 export with one typed repository per entry
///
/// Each entry is `(repo_id, repo_type_note, content_units)`.
pub fn write_snapshot(dir: &Path, repos: &[(&str, &str, u64)]) {
    let mut repo_lines = String::new();
    let mut unit_lines = String::new();

    for (repo_id, repo_type, units) in repos {
        repo_lines.push_str(
            &json!({
                "_id": {"$oid": format!("5e5d{}", repo_id)},
                "repo_id": repo_id,
                "display_name": repo_id,
                "notes": {"_repo-type": repo_type},
            })
            .to_string(),
        );
        repo_lines.push('\n');

        let unit_type = repo_type.strip_suffix("-repo").unwrap_or(repo_type);
        for n in 0..*units {
            unit_lines.push_str(
                &json!({
                    "repo_id": repo_id,
                    "unit_id": format!("{}-{}", repo_id, n),
                    "unit_type_id": unit_type,
                })
                .to_string(),
            );
            unit_lines.push('\n');
        }
    }

    std::fs::write(dir.join("repos.json"), repo_lines).unwrap();
    std::fs::write(dir.join("repo_content_units.json"), unit_lines).unwrap();
}

/// The ISO fixture used by most tests: file (3), file2 (3), file-many (250),
/// plus an RPM repository that must be ignored
pub fn write_default_snapshot(dir: &Path) {
    write_snapshot(
        dir,
        &[
            ("file", "iso-repo", 3),
            ("file2", "iso-repo", 3),
            ("zoo", "rpm-repo", 5),
            ("file-many", "iso-repo", 250),
        ],
    );
}

pub fn test_monitor() -> TaskMonitor {
    TaskMonitor::new(Duration::from_millis(10), Duration::from_secs(5))
}

/// Harness against a mock server and a snapshot directory
pub fn create_harness(pulp: &MockPulp, snapshot_dir: &Path) -> MigrationHarness {
    let client = ApiClient::new(ApiClientConfig::new(&pulp.uri(), "admin", "password")).unwrap();
    let store = SnapshotStore::load(snapshot_dir).unwrap();
    MigrationHarness::new(client, test_monitor(), Arc::new(store), "iso")
}

/// Configuration file pointing at a mock server and snapshot
pub fn write_config(dir: &Path, host: &str, snapshot_dir: &Path) -> std::path::PathBuf {
    let config_path = dir.join("config.yaml");
    let yaml = format!(
        r#"
pulp:
  host: "{host}"
  username: "admin"
  password: "password"
tasks:
  poll_interval_millis: 10
  timeout_seconds: 5
legacy:
  snapshot_dir: "{snapshot}"
  plugin: "iso"
"#,
        host = host,
        snapshot = snapshot_dir.display()
    );
    std::fs::write(&config_path, yaml).unwrap();
    config_path
}
