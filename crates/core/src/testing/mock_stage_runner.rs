//! Mock stage runner for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::tool::{StageCommand, StageKind, StageRunner, ToolError};

/// Flags whose values name files a stage reads.
const INPUT_FLAGS: [&str; 4] = [
    "-computeThresholds=",
    "-computeCellStates=",
    "-thresholdFile=",
    "-computeHeterogeneity=",
];

/// Default heterogeneity output written by the mock.
pub const DEFAULT_METRICS: &str = "Region\tCellFamily_Heterogeneity\tCellSocial_Heterogeneity\tMolecular_Heterogeneity\n\
                                   mock\t0.7312\t0.1864\t1.9021\n";

/// A recorded stage invocation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedStage {
    pub command: StageCommand,
    pub success: bool,
}

/// Mock implementation of the StageRunner trait.
///
/// Behaves like the real tool at the file level: a successful stage writes
/// every declared output, and a stage whose input files are missing fails
/// with exit code 1. The heterogeneity stage writes the configured metrics
/// table.
#[derive(Debug, Clone)]
pub struct MockStageRunner {
    stages: Arc<RwLock<Vec<RecordedStage>>>,
    exit_codes: Arc<RwLock<HashMap<StageKind, i32>>>,
    metrics: Arc<RwLock<String>>,
}

impl Default for MockStageRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStageRunner {
    /// Create a new mock runner where every stage succeeds.
    pub fn new() -> Self {
        Self {
            stages: Arc::new(RwLock::new(Vec::new())),
            exit_codes: Arc::new(RwLock::new(HashMap::new())),
            metrics: Arc::new(RwLock::new(DEFAULT_METRICS.to_string())),
        }
    }

    /// Make `stage` exit with `code`.
    pub async fn set_exit_code(&self, stage: StageKind, code: i32) {
        self.exit_codes.write().await.insert(stage, code);
    }

    /// Content written to the heterogeneity output.
    pub async fn set_metrics(&self, content: impl Into<String>) {
        *self.metrics.write().await = content.into();
    }

    /// Get all recorded invocations.
    pub async fn recorded_stages(&self) -> Vec<RecordedStage> {
        self.stages.read().await.clone()
    }

    /// Number of times `stage` was invoked.
    pub async fn invocation_count(&self, stage: StageKind) -> usize {
        self.stages
            .read()
            .await
            .iter()
            .filter(|s| s.command.stage == stage)
            .count()
    }

    fn render(command: &StageCommand) -> String {
        format!("mock-moha {}", command.args.join(" "))
    }

    fn missing_input(command: &StageCommand) -> Option<String> {
        command.args.iter().find_map(|arg| {
            INPUT_FLAGS
                .iter()
                .find_map(|flag| arg.strip_prefix(flag))
                .filter(|path| !Path::new(path).exists())
                .map(str::to_string)
        })
    }

    async fn record(&self, command: &StageCommand, success: bool) {
        self.stages.write().await.push(RecordedStage {
            command: command.clone(),
            success,
        });
    }
}

#[async_trait]
impl StageRunner for MockStageRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run_stage(&self, command: &StageCommand) -> Result<(), ToolError> {
        let code = self
            .exit_codes
            .read()
            .await
            .get(&command.stage)
            .copied()
            .unwrap_or(0);
        if code != 0 {
            self.record(command, false).await;
            return Err(ToolError::command_failed(code, Self::render(command), None));
        }

        if let Some(path) = Self::missing_input(command) {
            self.record(command, false).await;
            return Err(ToolError::command_failed(
                1,
                Self::render(command),
                Some(format!("input not found: {}", path)),
            ));
        }

        let metrics = self.metrics.read().await.clone();
        for output in &command.outputs {
            let content = match command.stage {
                StageKind::Heterogeneity => metrics.clone(),
                stage => format!("{} output\n", stage),
            };
            tokio::fs::write(output, content)
                .await
                .map_err(|source| ToolError::LaunchFailed {
                    command: Self::render(command),
                    source,
                })?;
        }

        self.record(command, true).await;
        Ok(())
    }
}
