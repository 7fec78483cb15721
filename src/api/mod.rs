//! Pulp 3 REST API clients
//!
//! Thin typed clients for the three resource groups the harness talks to:
//! core tasks, file repositories (with their versions and content), and
//! migration plans.
//!
//! # Example
//!
//! ```no_run
//! use pulp_migrate_check::api::{ApiClient, ApiClientConfig, FileRepositoriesApi};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiClientConfig::new("http://localhost:24817", "admin", "password");
//! let client = ApiClient::new(config)?;
//! let repos = FileRepositoriesApi::new(client).list(Some("file")).await?;
//! println!("{} repositories named 'file'", repos.count);
//! # Ok(())
//! # }
//! ```
//!
//! # Tracing
//!
//! Every request runs in a span named `pulp.api.get` or `pulp.api.post` with
//! `pulp.resource`, `http.url` and `http.status_code` attributes.

mod file;
mod migration;
mod tasks;

pub use file::{
    FileContent, FileContentApi, FileRepositoriesApi, FileRepository, FileRepositoryVersionsApi,
    RepositoryVersion,
};
pub use migration::{AsyncOperationResponse, MigrationPlanResponse, MigrationPlansApi, RunOptions};
pub use tasks::{Task, TaskError, TaskState, TasksApi};

use crate::config::PulpConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default timeout for API requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Request to Pulp failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Pulp returned status {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// HTTP status code, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// One page of a list endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// API client configuration
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Server URL (e.g., "http://pulp3:24817")
    pub host: String,
    pub username: String,
    pub password: String,
    /// API root path (default: "/pulp/api/v3/")
    pub api_root: String,
    /// Request timeout (default: 30 seconds)
    pub timeout: Option<Duration>,
}

impl ApiClientConfig {
    pub fn new(host: &str, username: &str, password: &str) -> Self {
        Self {
            host: host.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            api_root: "/pulp/api/v3/".to_string(),
            timeout: None,
        }
    }
}

impl From<&PulpConfig> for ApiClientConfig {
    fn from(config: &PulpConfig) -> Self {
        Self {
            host: config.host.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            api_root: config.api_root.clone(),
            timeout: Some(config.request_timeout()),
        }
    }
}

/// Shared HTTP client with credentials
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiClientConfig,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        Ok(Self { config, http })
    }

    pub fn host(&self) -> &str {
        self.config.host.trim_end_matches('/')
    }

    /// Absolute URL for an href returned by the server
    ///
    /// Pulp hrefs are host-relative (`/pulp/api/v3/tasks/<id>/`); absolute
    /// URLs are returned unchanged.
    pub fn url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            return href.to_string();
        }
        format!("{}/{}", self.host(), href.trim_start_matches('/'))
    }

    /// Absolute URL for a path under the API root
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{}{}",
            self.host(),
            self.config.api_root,
            path.trim_start_matches('/')
        )
    }

    #[tracing::instrument(
        name = "pulp.api.get",
        skip(self, query),
        fields(
            pulp.resource = resource,
            http.method = "GET",
            http.url = %url,
            http.status_code = tracing::field::Empty
        ),
        err
    )]
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let result = self
            .http
            .get(url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .query(query)
            .send()
            .await;

        Self::decode(resource, url, result).await
    }

    #[tracing::instrument(
        name = "pulp.api.post",
        skip(self, body),
        fields(
            pulp.resource = resource,
            http.method = "POST",
            http.url = %url,
            http.status_code = tracing::field::Empty
        ),
        err
    )]
    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        resource: &str,
        url: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let result = self
            .http
            .post(url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(body)
            .send()
            .await;

        Self::decode(resource, url, result).await
    }

    async fn decode<T: DeserializeOwned>(
        resource: &str,
        url: &str,
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<T, ApiError> {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                crate::metrics::record_api_request(resource, None);
                return Err(ApiError::Request(e));
            }
        };

        let status = response.status();
        crate::metrics::record_api_request(resource, Some(status.as_u16()));
        tracing::Span::current().record("http.status_code", status.as_u16());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(host: &str) -> ApiClient {
        ApiClient::new(ApiClientConfig::new(host, "admin", "password")).unwrap()
    }

    #[test]
    fn test_url_joins_relative_href() {
        let client = client("http://pulp3:24817/");
        assert_eq!(
            client.url("/pulp/api/v3/tasks/abc/"),
            "http://pulp3:24817/pulp/api/v3/tasks/abc/"
        );
    }

    #[test]
    fn test_url_keeps_absolute_href() {
        let client = client("http://pulp3:24817");
        assert_eq!(
            client.url("https://other/pulp/api/v3/tasks/abc/"),
            "https://other/pulp/api/v3/tasks/abc/"
        );
    }

    #[test]
    fn test_endpoint_under_api_root() {
        let client = client("http://pulp3:24817");
        assert_eq!(
            client.endpoint("repositories/file/file/"),
            "http://pulp3:24817/pulp/api/v3/repositories/file/file/"
        );
    }

    #[test]
    fn test_endpoint_trims_trailing_slash_on_host() {
        let client = client("http://pulp3:24817/");
        assert_eq!(
            client.endpoint("status/"),
            "http://pulp3:24817/pulp/api/v3/status/"
        );
    }

    #[test]
    fn test_status_error_message() {
        let err = ApiError::Status {
            status: 404,
            url: "http://pulp3/x/".into(),
            body: "Not found.".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("404"));
    }
}
