//! Error types for the workspace module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while preparing or inspecting a workspace.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The workspace directory could not be created.
    #[error("Failed to create workspace directory: {path}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The workspace directory could not be listed.
    #[error("Failed to read workspace directory: {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stale entry could not be removed.
    #[error("Failed to remove workspace entry: {path}")]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
