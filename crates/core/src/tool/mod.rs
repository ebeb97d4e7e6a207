//! External analysis tool module.
//!
//! This module provides the `StageRunner` trait and the process-based
//! [`MohaTool`] implementation that launches one MOHA tool sub-command per
//! pipeline stage.
//!
//! # Example
//!
//! ```ignore
//! use moha_core::tool::{MohaTool, StageCommand, StageRunner};
//! use moha_core::config::ToolConfig;
//!
//! let tool = MohaTool::new(ToolConfig::default());
//! let command = StageCommand::thresholds(Path::new("/rt106/data/quant_7.csv"), "_Cell_Mean");
//!
//! // Runs `java -jar MOHAtool.jar -computeThresholds=... -biomarkerMetricTag=_Cell_Mean`
//! tool.run_stage(&command).await?;
//! ```

mod error;
mod moha;
mod traits;
mod types;

pub use error::ToolError;
pub use moha::MohaTool;
pub use traits::StageRunner;
pub use types::{StageCommand, StageKind};
