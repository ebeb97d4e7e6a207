//! Publishing stage outputs back to the data store.

use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::datastore::{DataStore, DataStoreError};
use crate::workspace::Workspace;

use super::error::PipelineError;

/// How a publish outcome affects the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishPolicy {
    /// A forbidden or failed upload ends the run.
    Gate,
    /// The outcome is logged and the run continues.
    Unchecked,
}

/// Where and how outputs of one run are uploaded.
#[derive(Debug, Clone)]
pub struct PublishTarget {
    /// Logical remote path shared by all outputs of the run.
    pub remote_path: String,
    /// Format tag attached to each upload.
    pub format: String,
    /// Overwrite existing artifacts.
    pub force: bool,
}

impl PublishTarget {
    /// Uploads one workspace file and returns the data store's status.
    pub async fn publish(
        &self,
        store: &dyn DataStore,
        workspace: &Workspace,
        local_name: &str,
    ) -> Result<StatusCode, DataStoreError> {
        store
            .post_instance(
                &self.remote_path,
                workspace.dir(),
                local_name,
                &self.format,
                self.force,
            )
            .await
    }

    /// Uploads one workspace file and applies `policy` to the outcome.
    ///
    /// Only `403 Forbidden` and transport failures count as failures; other
    /// non-success codes are logged and tolerated.
    pub async fn publish_with_policy(
        &self,
        store: &dyn DataStore,
        workspace: &Workspace,
        local_name: &str,
        policy: PublishPolicy,
    ) -> Result<(), PipelineError> {
        match self.publish(store, workspace, local_name).await {
            Ok(status) if status == StatusCode::FORBIDDEN => match policy {
                PublishPolicy::Gate => Err(PipelineError::PublishForbidden {
                    file: local_name.to_string(),
                    remote_path: self.remote_path.clone(),
                }),
                PublishPolicy::Unchecked => {
                    warn!(
                        "Upload of {} to {} forbidden (force={}), continuing",
                        local_name, self.remote_path, self.force
                    );
                    Ok(())
                }
            },
            Ok(status) if !status.is_success() => {
                warn!("Upload of {} returned {}", local_name, status);
                Ok(())
            }
            Ok(status) => {
                debug!("Uploaded {} to {} ({})", local_name, self.remote_path, status);
                Ok(())
            }
            Err(e) => match policy {
                PublishPolicy::Gate => Err(PipelineError::PublishFailed {
                    file: local_name.to_string(),
                    source: e,
                }),
                PublishPolicy::Unchecked => {
                    warn!("Upload of {} failed, continuing: {}", local_name, e);
                    Ok(())
                }
            },
        }
    }
}
