//! MOHA analysis pipeline.
//!
//! The [`MohaPipeline`] runs one region through the full adaptor flow:
//! - Workspace preparation and input resolution
//! - Threshold computation, cell-state classification and heterogeneity
//!   aggregation, each followed by publishing its outputs
//! - Extraction of the heterogeneity metrics and the nuclear image path
//!
//! Every step is awaited before the next one starts, and the first failure
//! ends the run with an empty result and a single status code.
//!
//! # Example
//!
//! ```ignore
//! use moha_core::pipeline::{run, RunContext};
//! use moha_core::{Config, HttpDataStore, MohaTool};
//!
//! let config = Config::default();
//! let store = Arc::new(HttpDataStore::new(config.datastore.clone())?);
//! let tool = Arc::new(MohaTool::new(config.tool.clone()));
//!
//! let context = RunContext::new("slide-1", "006", "0").with_force(true);
//! let report = run(store, tool, &config, &context).await;
//! println!("{}", serde_json::to_string(&report)?);
//! ```

mod error;
mod extract;
mod publish;
mod resolve;
mod runner;
mod stages;
mod types;

pub use error::PipelineError;
pub use extract::{extract, parse_metrics_table, ExtractError, HeterogeneityMetrics};
pub use publish::{PublishPolicy, PublishTarget};
pub use resolve::resolve_and_fetch;
pub use runner::{run, MohaPipeline};
pub use stages::{plan_stages, StageDescriptor};
pub use types::{
    PipelineOutcome, PipelineState, PipelineStatus, ResultContext, RunContext, RunReport,
};
