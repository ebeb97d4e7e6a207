//! Mock data store for testing.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::datastore::{DataStore, DataStoreError, QUANT_TAG};

/// Data store operations, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataStoreOperation {
    ResultImagePath,
    GetInstance,
    ResultPath,
    PostInstance,
    PrimaryPath,
}

/// A recorded upload for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub remote_path: String,
    pub local_dir: PathBuf,
    pub local_name: String,
    pub format: String,
    pub force: bool,
    /// File content at upload time, `None` if the file was missing.
    pub content: Option<Vec<u8>>,
    /// Status returned to the caller.
    pub status: StatusCode,
}

/// Mock implementation of the DataStore trait.
///
/// Provides controllable behavior for testing:
/// - Register quantification tables per slide/region/branch
/// - Override upload status codes per file name (e.g. 403)
/// - Inject transport failures per operation
/// - Track every call for ordering assertions
///
/// # Example
///
/// ```rust,ignore
/// use moha_core::testing::MockDataStore;
///
/// let store = MockDataStore::new();
/// store.add_quant_table("S1", "006", "0", b"CellID,DAPI_Cell_Mean\n1,0.5\n").await;
/// store.set_post_status("quant_006.csv.thresholds.txt", StatusCode::FORBIDDEN).await;
///
/// // ... run the pipeline ...
///
/// assert_eq!(store.recorded_posts().await.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockDataStore {
    /// Result image paths keyed by `slide/region/branch/tag`.
    result_image_paths: Arc<RwLock<HashMap<String, String>>>,
    /// Downloadable instance contents by remote path.
    instances: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    /// Status override for downloads.
    get_status: Arc<RwLock<Option<StatusCode>>>,
    /// Status overrides for uploads by local file name.
    post_statuses: Arc<RwLock<HashMap<String, StatusCode>>>,
    /// Operations that fail with a transport error.
    failing: Arc<RwLock<HashSet<DataStoreOperation>>>,
    /// Recorded uploads.
    posts: Arc<RwLock<Vec<RecordedPost>>>,
    /// Names of every call, in order.
    calls: Arc<RwLock<Vec<&'static str>>>,
}

impl Default for MockDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDataStore {
    /// Create a new mock data store with no registered artifacts.
    pub fn new() -> Self {
        Self {
            result_image_paths: Arc::new(RwLock::new(HashMap::new())),
            instances: Arc::new(RwLock::new(HashMap::new())),
            get_status: Arc::new(RwLock::new(None)),
            post_statuses: Arc::new(RwLock::new(HashMap::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            posts: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    fn key(slide: &str, region: &str, branch: &str, tag: &str) -> String {
        format!("{}/{}/{}/{}", slide, region, branch, tag)
    }

    /// Remote path the mock reports for a result of `tag`.
    pub fn result_path(slide: &str, region: &str, branch: &str, tag: &str) -> String {
        format!(
            "/pathology/slides/{}/regions/{}/branches/{}/results/{}",
            slide, region, branch, tag
        )
    }

    /// Remote path the mock reports for a primary image channel.
    pub fn primary_path(slide: &str, region: &str, tag: &str) -> String {
        format!(
            "/pathology/slides/{}/regions/{}/channels/{}/image.tif",
            slide, region, tag
        )
    }

    /// Register a quantification table that can be resolved and downloaded.
    pub async fn add_quant_table(&self, slide: &str, region: &str, branch: &str, content: &[u8]) {
        let remote = format!("{}/quant.csv", Self::result_path(slide, region, branch, QUANT_TAG));
        self.result_image_paths
            .write()
            .await
            .insert(Self::key(slide, region, branch, QUANT_TAG), remote.clone());
        self.instances.write().await.insert(remote, content.to_vec());
    }

    /// Register a result image path without a downloadable instance.
    pub async fn add_result_image_path(
        &self,
        slide: &str,
        region: &str,
        branch: &str,
        tag: &str,
        remote_path: &str,
    ) {
        self.result_image_paths
            .write()
            .await
            .insert(Self::key(slide, region, branch, tag), remote_path.to_string());
    }

    /// Force every download to return `status`.
    pub async fn set_get_status(&self, status: StatusCode) {
        *self.get_status.write().await = Some(status);
    }

    /// Return `status` for uploads of `local_name`.
    pub async fn set_post_status(&self, local_name: &str, status: StatusCode) {
        self.post_statuses
            .write()
            .await
            .insert(local_name.to_string(), status);
    }

    /// Make `operation` fail with a connection error.
    pub async fn set_failing(&self, operation: DataStoreOperation) {
        self.failing.write().await.insert(operation);
    }

    /// Get all recorded uploads.
    pub async fn recorded_posts(&self) -> Vec<RecordedPost> {
        self.posts.read().await.clone()
    }

    /// Names of all calls made so far, in order.
    pub async fn calls(&self) -> Vec<&'static str> {
        self.calls.read().await.clone()
    }

    /// Clear recorded calls and uploads.
    pub async fn clear_recorded(&self) {
        self.posts.write().await.clear();
        self.calls.write().await.clear();
    }

    async fn enter(
        &self,
        name: &'static str,
        operation: DataStoreOperation,
    ) -> Result<(), DataStoreError> {
        self.calls.write().await.push(name);
        if self.failing.read().await.contains(&operation) {
            return Err(DataStoreError::ConnectionFailed(format!(
                "mock {} failure",
                name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DataStore for MockDataStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get_pathology_result_image_path(
        &self,
        slide: &str,
        region: &str,
        branch: &str,
        tag: &str,
    ) -> Result<Option<String>, DataStoreError> {
        self.enter("get_pathology_result_image_path", DataStoreOperation::ResultImagePath)
            .await?;
        Ok(self
            .result_image_paths
            .read()
            .await
            .get(&Self::key(slide, region, branch, tag))
            .cloned())
    }

    async fn get_instance(
        &self,
        remote_path: &str,
        local_dir: &Path,
        local_name: &str,
        _format: &str,
    ) -> Result<StatusCode, DataStoreError> {
        self.enter("get_instance", DataStoreOperation::GetInstance)
            .await?;

        if let Some(status) = *self.get_status.read().await {
            return Ok(status);
        }

        match self.instances.read().await.get(remote_path) {
            Some(content) => {
                tokio::fs::write(local_dir.join(local_name), content).await?;
                Ok(StatusCode::OK)
            }
            None => Ok(StatusCode::NOT_FOUND),
        }
    }

    async fn get_pathology_result_path(
        &self,
        slide: &str,
        region: &str,
        branch: &str,
        tag: &str,
    ) -> Result<String, DataStoreError> {
        self.enter("get_pathology_result_path", DataStoreOperation::ResultPath)
            .await?;
        Ok(Self::result_path(slide, region, branch, tag))
    }

    async fn post_instance(
        &self,
        remote_path: &str,
        local_dir: &Path,
        local_name: &str,
        format: &str,
        force: bool,
    ) -> Result<StatusCode, DataStoreError> {
        self.enter("post_instance", DataStoreOperation::PostInstance)
            .await?;

        let status = self
            .post_statuses
            .read()
            .await
            .get(local_name)
            .copied()
            .unwrap_or(StatusCode::OK);
        let content = tokio::fs::read(local_dir.join(local_name)).await.ok();

        self.posts.write().await.push(RecordedPost {
            remote_path: remote_path.to_string(),
            local_dir: local_dir.to_path_buf(),
            local_name: local_name.to_string(),
            format: format.to_string(),
            force,
            content,
            status,
        });
        Ok(status)
    }

    async fn get_pathology_primary_path(
        &self,
        slide: &str,
        region: &str,
        tag: &str,
    ) -> Result<String, DataStoreError> {
        self.enter("get_pathology_primary_path", DataStoreOperation::PrimaryPath)
            .await?;
        Ok(Self::primary_path(slide, region, tag))
    }
}
