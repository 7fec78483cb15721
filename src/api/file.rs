//! File plugin resources: repositories, repository versions, content

use super::{ApiClient, ApiError, Page};
use serde::{Deserialize, Serialize};

/// A file repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRepository {
    pub pulp_href: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub latest_version_href: Option<String>,
    #[serde(default)]
    pub versions_href: Option<String>,
}

/// An immutable repository version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryVersion {
    pub pulp_href: String,
    pub number: u64,
    #[serde(default)]
    pub base_version: Option<String>,
}

/// A file content unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileContent {
    pub pulp_href: String,
    #[serde(default)]
    pub relative_path: String,
    #[serde(default)]
    pub sha256: Option<String>,
}

/// File repositories API (`repositories/file/file/`)
#[derive(Debug, Clone)]
pub struct FileRepositoriesApi {
    client: ApiClient,
}

impl FileRepositoriesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List repositories, optionally filtered by exact name
    pub async fn list(&self, name: Option<&str>) -> Result<Page<FileRepository>, ApiError> {
        let url = self.client.endpoint("repositories/file/file/");
        let query: Vec<(&str, &str)> = name.map(|n| vec![("name", n)]).unwrap_or_default();
        self.client.get("file_repositories", &url, &query).await
    }
}

/// File repository versions API (`<repository_href>versions/`)
#[derive(Debug, Clone)]
pub struct FileRepositoryVersionsApi {
    client: ApiClient,
}

impl FileRepositoryVersionsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List a repository's versions, latest first
    pub async fn list(&self, repository_href: &str) -> Result<Page<RepositoryVersion>, ApiError> {
        let href = format!("{}/versions/", repository_href.trim_end_matches('/'));
        let url = self.client.url(&href);
        self.client
            .get("file_repository_versions", &url, &[("ordering", "-number")])
            .await
    }
}

/// File content API (`content/file/files/`)
#[derive(Debug, Clone)]
pub struct FileContentApi {
    client: ApiClient,
}

impl FileContentApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List content present in a repository version
    pub async fn list(&self, repository_version: &str) -> Result<Page<FileContent>, ApiError> {
        let url = self.client.endpoint("content/file/files/");
        self.client
            .get(
                "file_content",
                &url,
                &[("repository_version", repository_version)],
            )
            .await
    }
}
