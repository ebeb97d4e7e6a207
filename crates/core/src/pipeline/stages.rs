//! The fixed three-stage plan.

use crate::config::{PipelineConfig, ToolConfig};
use crate::tool::StageCommand;
use crate::workspace::{RegionFiles, Workspace};

use super::publish::PublishPolicy;

/// One pipeline step: the tool invocation plus which of its outputs are
/// published and how strictly.
#[derive(Debug, Clone)]
pub struct StageDescriptor {
    pub command: StageCommand,
    /// Workspace file names uploaded after the stage succeeds, in order.
    pub publish: Vec<String>,
    pub policy: PublishPolicy,
}

/// Builds the stage sequence for a region.
///
/// Each stage reads exactly the file names the previous stage declared.
pub fn plan_stages(
    workspace: &Workspace,
    files: &RegionFiles,
    tool: &ToolConfig,
    pipeline: &PipelineConfig,
) -> Vec<StageDescriptor> {
    let quant = workspace.path(&files.quant);
    let thresholds = workspace.path(&files.thresholds);
    let marker_states = workspace.path(&files.marker_states);
    let heterogeneity = workspace.path(&files.heterogeneity);

    let cell_state_policy = if pipeline.gate_cell_state_publish {
        PublishPolicy::Gate
    } else {
        PublishPolicy::Unchecked
    };

    vec![
        StageDescriptor {
            command: StageCommand::thresholds(&quant, &tool.biomarker_metric_tag),
            publish: vec![files.thresholds.clone()],
            policy: PublishPolicy::Gate,
        },
        StageDescriptor {
            command: StageCommand::cell_states(&quant, &thresholds),
            publish: vec![files.marker_states.clone(), files.marker_index.clone()],
            policy: cell_state_policy,
        },
        StageDescriptor {
            command: StageCommand::heterogeneity(&marker_states, &heterogeneity),
            publish: vec![files.heterogeneity.clone()],
            policy: PublishPolicy::Gate,
        },
    ]
}
