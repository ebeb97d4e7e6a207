//! Trait definitions for the tool module.

use async_trait::async_trait;

use super::error::ToolError;
use super::types::StageCommand;

/// Runs one analysis stage to completion.
#[async_trait]
pub trait StageRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Runs the stage and waits for it. Success means a zero exit code.
    async fn run_stage(&self, command: &StageCommand) -> Result<(), ToolError>;
}
