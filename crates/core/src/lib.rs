pub mod config;
pub mod datastore;
pub mod pipeline;
pub mod testing;
pub mod tool;
pub mod workspace;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatastoreConfig,
    LoggingConfig, PipelineConfig, ToolConfig, WorkspaceConfig,
};
pub use datastore::{DataStore, DataStoreError, HttpDataStore};
pub use pipeline::{
    run, MohaPipeline, PipelineError, PipelineOutcome, PipelineState, PipelineStatus,
    ResultContext, RunContext, RunReport,
};
pub use tool::{MohaTool, StageCommand, StageKind, StageRunner, ToolError};
pub use workspace::{RegionFiles, Workspace, WorkspaceError};
