//! Error type for pipeline runs.

use thiserror::Error;

use crate::datastore::DataStoreError;
use crate::tool::{StageKind, ToolError};
use crate::workspace::WorkspaceError;

use super::extract::ExtractError;
use super::types::PipelineStatus;

/// Every way a run can end early. Each variant maps to exactly one
/// [`PipelineStatus`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The quantification table could not be located or downloaded.
    #[error("Quantification table not found: {reason}")]
    QuantFileNotFound { reason: String },

    /// The scratch workspace could not be prepared.
    #[error("Workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    /// The logical output path could not be resolved.
    #[error("Failed to resolve output path: {0}")]
    OutputPathUnavailable(#[source] DataStoreError),

    /// An analysis stage exited unsuccessfully.
    #[error("{stage} stage failed: {source}")]
    StageFailed {
        stage: StageKind,
        #[source]
        source: ToolError,
    },

    /// The data store refused an upload.
    #[error("Upload of {file} to {remote_path} forbidden")]
    PublishForbidden { file: String, remote_path: String },

    /// An upload could not be performed.
    #[error("Upload of {file} failed: {source}")]
    PublishFailed {
        file: String,
        #[source]
        source: DataStoreError,
    },

    /// The metrics file was malformed or incomplete.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// The nuclear reference image could not be resolved.
    #[error("Failed to resolve nuclear image: {0}")]
    NuclearImageUnavailable(#[source] DataStoreError),
}

impl PipelineError {
    pub fn quant_not_found(reason: impl Into<String>) -> Self {
        Self::QuantFileNotFound {
            reason: reason.into(),
        }
    }

    /// The status reported to the caller for this error.
    pub fn status(&self) -> PipelineStatus {
        match self {
            Self::QuantFileNotFound { .. } => PipelineStatus::ErrorQuantFileNotFound,
            Self::StageFailed { .. } => PipelineStatus::ExecutionFinishedError,
            Self::Workspace(_)
            | Self::OutputPathUnavailable(_)
            | Self::PublishForbidden { .. }
            | Self::PublishFailed { .. }
            | Self::Extract(_)
            | Self::NuclearImageUnavailable(_) => PipelineStatus::ExecutionError,
        }
    }
}
