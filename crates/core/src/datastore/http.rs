//! HTTP data store client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::DatastoreConfig;

use super::{DataStore, DataStoreError};

/// Path lookup response body.
#[derive(Debug, Deserialize)]
struct PathResponse {
    path: String,
}

/// Data store client talking to the REST API.
pub struct HttpDataStore {
    client: Client,
    config: DatastoreConfig,
}

impl HttpDataStore {
    /// Create a new client.
    pub fn new(config: DatastoreConfig) -> Result<Self, DataStoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| DataStoreError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Builds `{base}/v1/pathology/slides/{slide}/regions/{region}/{tail...}`.
    fn pathology_url(&self, slide: &str, region: &str, tail: &[&str]) -> String {
        let mut url = format!(
            "{}/v1/pathology/slides/{}/regions/{}",
            self.base_url(),
            urlencoding::encode(slide),
            urlencoding::encode(region)
        );
        for segment in tail {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    /// Builds `{base}/v1/instance/{remote_path}/{tail...}`.
    ///
    /// Each segment of the remote path is encoded separately so its
    /// hierarchy survives.
    fn instance_url(&self, remote_path: &str, tail: &[&str]) -> String {
        let mut url = format!("{}/v1/instance", self.base_url());
        let segments = remote_path
            .split('/')
            .filter(|s| !s.is_empty())
            .chain(tail.iter().copied());
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    /// GET a path lookup endpoint. A 404 maps to `None`.
    async fn lookup_path(&self, url: &str) -> Result<Option<String>, DataStoreError> {
        debug!("Data store lookup: {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DataStoreError::ApiError(format!("HTTP {} from {}", status, url)));
        }

        let body: PathResponse = response.json().await?;
        Ok(Some(body.path))
    }

    /// Like [`lookup_path`](Self::lookup_path) but a missing path is an error.
    async fn require_path(&self, url: &str) -> Result<String, DataStoreError> {
        self.lookup_path(url)
            .await?
            .ok_or_else(|| DataStoreError::ApiError(format!("HTTP 404 from {}", url)))
    }
}

#[async_trait]
impl DataStore for HttpDataStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn get_pathology_result_image_path(
        &self,
        slide: &str,
        region: &str,
        branch: &str,
        tag: &str,
    ) -> Result<Option<String>, DataStoreError> {
        let url = self.pathology_url(slide, region, &["branches", branch, "results", tag, "image"]);
        self.lookup_path(&url).await
    }

    async fn get_instance(
        &self,
        remote_path: &str,
        local_dir: &Path,
        local_name: &str,
        format: &str,
    ) -> Result<StatusCode, DataStoreError> {
        let url = self.instance_url(remote_path, &[format]);
        debug!("Fetching instance {} into {:?}", url, local_dir.join(local_name));

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Ok(status);
        }

        let bytes = response.bytes().await?;
        tokio::fs::write(local_dir.join(local_name), &bytes).await?;
        Ok(status)
    }

    async fn get_pathology_result_path(
        &self,
        slide: &str,
        region: &str,
        branch: &str,
        tag: &str,
    ) -> Result<String, DataStoreError> {
        let url = self.pathology_url(slide, region, &["branches", branch, "results", tag]);
        self.require_path(&url).await
    }

    async fn post_instance(
        &self,
        remote_path: &str,
        local_dir: &Path,
        local_name: &str,
        format: &str,
        force: bool,
    ) -> Result<StatusCode, DataStoreError> {
        let url = self.instance_url(remote_path, &[local_name, format]);
        let data = tokio::fs::read(local_dir.join(local_name)).await?;
        debug!("Posting {} ({} bytes) to {} force={}", local_name, data.len(), url, force);

        let part = multipart::Part::bytes(data).file_name(local_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .query(&[("force", force)])
            .multipart(form)
            .send()
            .await?;

        Ok(response.status())
    }

    async fn get_pathology_primary_path(
        &self,
        slide: &str,
        region: &str,
        tag: &str,
    ) -> Result<String, DataStoreError> {
        let url = self.pathology_url(slide, region, &["channels", tag, "image"]);
        self.require_path(&url).await
    }
}
