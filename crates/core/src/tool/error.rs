//! Error types for the tool module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running an analysis stage.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool program not found.
    #[error("Tool program not found: {path}")]
    ProgramNotFound { path: PathBuf },

    /// The process could not be started.
    #[error("Failed to launch `{command}`")]
    LaunchFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exited with a non-zero code.
    ///
    /// `exit_code` is -1 when the process was terminated by a signal.
    #[error("{exit_code} - {command}")]
    CommandFailed {
        exit_code: i32,
        command: String,
        stderr: Option<String>,
    },
}

impl ToolError {
    /// Creates a new command failed error.
    pub fn command_failed(exit_code: i32, command: impl Into<String>, stderr: Option<String>) -> Self {
        Self::CommandFailed {
            exit_code,
            command: command.into(),
            stderr,
        }
    }

    /// Exit code of a failed command, if the process ran at all.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}
