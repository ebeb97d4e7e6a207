//! Trait definitions for the datastore module.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::Path;

use super::error::DataStoreError;

/// The subset of the pathology data store used by the pipeline.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Returns the name of this data store implementation.
    fn name(&self) -> &str;

    /// Looks up the remote path of a result image (e.g. the quantification
    /// table). `Ok(None)` means the data store has no such artifact.
    async fn get_pathology_result_image_path(
        &self,
        slide: &str,
        region: &str,
        branch: &str,
        tag: &str,
    ) -> Result<Option<String>, DataStoreError>;

    /// Downloads a remote instance into `local_dir/local_name`.
    ///
    /// Returns the data store's status; the file is only written on 200.
    async fn get_instance(
        &self,
        remote_path: &str,
        local_dir: &Path,
        local_name: &str,
        format: &str,
    ) -> Result<StatusCode, DataStoreError>;

    /// Returns the logical remote path under which results are published.
    async fn get_pathology_result_path(
        &self,
        slide: &str,
        region: &str,
        branch: &str,
        tag: &str,
    ) -> Result<String, DataStoreError>;

    /// Uploads `local_dir/local_name` under `remote_path`.
    ///
    /// A `403 Forbidden` status signals that an existing artifact blocks the
    /// upload because `force` was not set.
    async fn post_instance(
        &self,
        remote_path: &str,
        local_dir: &Path,
        local_name: &str,
        format: &str,
        force: bool,
    ) -> Result<StatusCode, DataStoreError>;

    /// Returns the remote path of a primary (acquired) image channel.
    async fn get_pathology_primary_path(
        &self,
        slide: &str,
        region: &str,
        tag: &str,
    ) -> Result<String, DataStoreError>;
}
