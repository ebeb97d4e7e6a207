//! Types for the pipeline module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::tool::StageKind;

use super::extract::HeterogeneityMetrics;

/// Parameters of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunContext {
    /// Slide identifier.
    pub slide: String,
    /// Region identifier; also keys every workspace file name.
    pub region: String,
    /// Analysis branch of the quantification result.
    pub branch: String,
    /// Overwrite existing artifacts when publishing.
    #[serde(default)]
    pub force: bool,
    /// Any further parameters supplied by the caller.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RunContext {
    pub fn new(slide: impl Into<String>, region: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            slide: slide.into(),
            region: region.into(),
            branch: branch.into(),
            force: false,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Externally visible run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineStatus {
    ExecutionFinishedSuccess,
    ExecutionFinishedError,
    ErrorQuantFileNotFound,
    ExecutionError,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExecutionFinishedSuccess => "EXECUTION_FINISHED_SUCCESS",
            Self::ExecutionFinishedError => "EXECUTION_FINISHED_ERROR",
            Self::ErrorQuantFileNotFound => "ERROR_QUANT_FILE_NOT_FOUND",
            Self::ExecutionError => "EXECUTION_ERROR",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::ExecutionFinishedSuccess)
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a run in the pipeline state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    InputResolved,
    Stage1Done,
    Stage2Done,
    Stage3Done,
    Extracted,
    /// Absorbing failure state.
    Failed(PipelineStatus),
}

impl PipelineState {
    /// State reached once the given stage has run and been published.
    pub fn after_stage(stage: StageKind) -> Self {
        match stage {
            StageKind::Thresholds => Self::Stage1Done,
            StageKind::CellStates => Self::Stage2Done,
            StageKind::Heterogeneity => Self::Stage3Done,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("INIT"),
            Self::InputResolved => f.write_str("INPUT_RESOLVED"),
            Self::Stage1Done => f.write_str("STAGE1_DONE"),
            Self::Stage2Done => f.write_str("STAGE2_DONE"),
            Self::Stage3Done => f.write_str("STAGE3_DONE"),
            Self::Extracted => f.write_str("EXTRACTED"),
            Self::Failed(status) => write!(f, "FAILED({})", status),
        }
    }
}

/// Structured result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultContext {
    /// Remote path of the nuclear (DAPI) reference image.
    #[serde(rename = "nuclearImage")]
    pub nuclear_image: String,
    #[serde(flatten)]
    pub metrics: HeterogeneityMetrics,
}

impl ResultContext {
    /// Flattens the result into the key/value mapping returned to callers.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("nuclearImage".to_string(), self.nuclear_image.clone());
        map.insert(
            HeterogeneityMetrics::CELL_FAMILY.to_string(),
            self.metrics.cell_family.clone(),
        );
        map.insert(
            HeterogeneityMetrics::CELL_SOCIAL.to_string(),
            self.metrics.cell_social.clone(),
        );
        map.insert(
            HeterogeneityMetrics::MOLECULAR.to_string(),
            self.metrics.molecular.clone(),
        );
        map
    }
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    Success {
        result: ResultContext,
    },
    Failure {
        status: PipelineStatus,
        /// Last state reached before the failure.
        failed_at: PipelineState,
        /// Human-readable cause.
        reason: String,
    },
}

impl PipelineOutcome {
    pub fn status(&self) -> PipelineStatus {
        match self {
            Self::Success { .. } => PipelineStatus::ExecutionFinishedSuccess,
            Self::Failure { status, .. } => *status,
        }
    }

    pub fn into_report(self) -> RunReport {
        RunReport::from(self)
    }
}

/// Two-field report handed back to the caller. `result` is empty unless the
/// status is success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub result: BTreeMap<String, String>,
    pub status: PipelineStatus,
}

impl From<PipelineOutcome> for RunReport {
    fn from(outcome: PipelineOutcome) -> Self {
        match outcome {
            PipelineOutcome::Success { result } => Self {
                result: result.to_map(),
                status: PipelineStatus::ExecutionFinishedSuccess,
            },
            PipelineOutcome::Failure { status, .. } => Self {
                result: BTreeMap::new(),
                status,
            },
        }
    }
}
