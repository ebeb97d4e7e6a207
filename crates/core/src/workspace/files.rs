//! Deterministic per-region file names shared by all stages.

/// File names produced and consumed by the pipeline for one region.
///
/// These names are the contract between stages: the threshold stage writes
/// `thresholds` next to `quant`, the cell-state stage writes `marker_states`
/// and `marker_index`, and the heterogeneity stage writes `heterogeneity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFiles {
    pub quant: String,
    pub thresholds: String,
    pub marker_states: String,
    pub marker_index: String,
    pub heterogeneity: String,
}

impl RegionFiles {
    pub fn new(region: &str) -> Self {
        let quant = format!("quant_{}.csv", region);
        Self {
            thresholds: format!("{}.thresholds.txt", quant),
            marker_states: format!("{}.MarkerStates.txt", quant),
            marker_index: format!("{}.MarkerIndex.txt", quant),
            heterogeneity: format!("out_moha_{}.txt", region),
            quant,
        }
    }
}
