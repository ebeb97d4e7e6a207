//! Types for the tool module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The three MOHA tool sub-commands, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Thresholds,
    CellStates,
    Heterogeneity,
}

impl StageKind {
    /// All stages in execution order.
    pub const ALL: [StageKind; 3] = [Self::Thresholds, Self::CellStates, Self::Heterogeneity];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Thresholds => "thresholds",
            Self::CellStates => "cell_states",
            Self::Heterogeneity => "heterogeneity",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully resolved stage invocation: tool arguments plus the files the stage
/// is expected to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCommand {
    pub stage: StageKind,
    /// Arguments appended after the configured program arguments.
    pub args: Vec<String>,
    /// Files the stage declares as its outputs.
    pub outputs: Vec<PathBuf>,
}

impl StageCommand {
    /// Threshold computation over a quantification table.
    ///
    /// Writes `<quant>.thresholds.txt` next to the input.
    pub fn thresholds(quant: &Path, biomarker_metric_tag: &str) -> Self {
        Self {
            stage: StageKind::Thresholds,
            args: vec![
                format!("-computeThresholds={}", quant.display()),
                format!("-biomarkerMetricTag={}", biomarker_metric_tag),
            ],
            outputs: vec![with_suffix(quant, ".thresholds.txt")],
        }
    }

    /// Cell-state classification from the table and its thresholds.
    ///
    /// Writes `<quant>.MarkerStates.txt` and `<quant>.MarkerIndex.txt`.
    pub fn cell_states(quant: &Path, thresholds: &Path) -> Self {
        Self {
            stage: StageKind::CellStates,
            args: vec![
                format!("-computeCellStates={}", quant.display()),
                format!("-thresholdFile={}", thresholds.display()),
            ],
            outputs: vec![
                with_suffix(quant, ".MarkerStates.txt"),
                with_suffix(quant, ".MarkerIndex.txt"),
            ],
        }
    }

    /// Heterogeneity aggregation over marker states into `output`.
    ///
    /// Appending is disabled so reruns overwrite the output.
    pub fn heterogeneity(marker_states: &Path, output: &Path) -> Self {
        Self {
            stage: StageKind::Heterogeneity,
            args: vec![
                format!("-computeHeterogeneity={}", marker_states.display()),
                format!("-outputFile={}", output.display()),
                "-append=false".to_string(),
            ],
            outputs: vec![output.to_path_buf()],
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
