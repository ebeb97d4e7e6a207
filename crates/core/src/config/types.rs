use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub datastore: DatastoreConfig,
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Scratch workspace configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    /// Directory cleared at the start of every run.
    #[serde(default = "default_workspace_dir")]
    pub dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            dir: default_workspace_dir(),
        }
    }
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from("/rt106/data")
}

/// Data store client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatastoreConfig {
    /// Base URL of the data store (e.g., "http://datastore:5106")
    #[serde(default = "default_datastore_url")]
    pub url: String,
    /// Request timeout in seconds (default: 60)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            url: default_datastore_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_datastore_url() -> String {
    "http://datastore:5106".to_string()
}

fn default_timeout() -> u32 {
    60
}

/// External analysis tool configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolConfig {
    /// Program to launch.
    #[serde(default = "default_program")]
    pub program: PathBuf,
    /// Arguments placed before the stage arguments.
    #[serde(default = "default_program_args")]
    pub program_args: Vec<String>,
    /// Working directory for the tool process (inherits when unset).
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Column suffix selecting the biomarker measurement used for thresholds.
    #[serde(default = "default_biomarker_metric_tag")]
    pub biomarker_metric_tag: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            program_args: default_program_args(),
            working_dir: None,
            biomarker_metric_tag: default_biomarker_metric_tag(),
        }
    }
}

fn default_program() -> PathBuf {
    PathBuf::from("java")
}

fn default_program_args() -> Vec<String> {
    vec!["-jar".to_string(), "MOHAtool.jar".to_string()]
}

fn default_biomarker_metric_tag() -> String {
    "_Cell_Mean".to_string()
}

/// Pipeline behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Fail the run when a cell-state output upload is forbidden.
    #[serde(default)]
    pub gate_cell_state_publish: bool,
    /// Format tag attached to every published output.
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gate_cell_state_publish: false,
            output_format: default_output_format(),
        }
    }
}

fn default_output_format() -> String {
    "csv".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}
