//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the collaborator traits,
//! so whole pipeline runs can be tested without a data store or a JVM.
//!
//! # Example
//!
//! ```rust,ignore
//! use moha_core::testing::{MockDataStore, MockStageRunner};
//!
//! let store = MockDataStore::new();
//! let runner = MockStageRunner::new();
//!
//! // Configure mock responses
//! store.add_quant_table("S1", "006", "0", b"CellID,DAPI_Cell_Mean\n").await;
//! runner.set_exit_code(StageKind::CellStates, 2).await;
//!
//! // Hand Arc-wrapped clones to MohaPipeline...
//! ```

mod mock_datastore;
mod mock_stage_runner;

pub use mock_datastore::{DataStoreOperation, MockDataStore, RecordedPost};
pub use mock_stage_runner::{MockStageRunner, RecordedStage, DEFAULT_METRICS};

/// Test fixtures and helper functions.
pub mod fixtures {
    /// A small quantification table with two markers.
    pub const QUANT_TABLE: &str = "CellID,DAPI_Cell_Mean,CD3_Cell_Mean,CD20_Cell_Mean\n\
                                   1,812.5,14.2,301.7\n\
                                   2,799.1,220.4,12.9\n\
                                   3,845.0,18.8,17.3\n";

    /// Builds a heterogeneity output with the given metric values.
    pub fn metrics_table(cell_family: &str, cell_social: &str, molecular: &str) -> String {
        format!(
            "CellFamily_Heterogeneity\tCellSocial_Heterogeneity\tMolecular_Heterogeneity\n{}\t{}\t{}\n",
            cell_family, cell_social, molecular
        )
    }
}
