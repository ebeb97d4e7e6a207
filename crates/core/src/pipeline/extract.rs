//! Heterogeneity metrics extraction.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::datastore::{DataStore, NUCLEAR_CHANNEL};

use super::error::PipelineError;
use super::types::{ResultContext, RunContext};

/// Errors raised while reading the heterogeneity output.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read metrics file {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Metrics file needs a header and a value row, found {found} line(s)")]
    MissingRows { found: usize },

    #[error("Metrics header has {header} columns but value row has {values}")]
    ColumnMismatch { header: usize, values: usize },

    #[error("Metric not found in output: {key}")]
    MissingMetric { key: String },
}

/// The three summary statistics reported for a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeterogeneityMetrics {
    #[serde(rename = "CellFamily_Heterogeneity")]
    pub cell_family: String,
    #[serde(rename = "CellSocial_Heterogeneity")]
    pub cell_social: String,
    #[serde(rename = "Molecular_Heterogeneity")]
    pub molecular: String,
}

impl HeterogeneityMetrics {
    pub const CELL_FAMILY: &'static str = "CellFamily_Heterogeneity";
    pub const CELL_SOCIAL: &'static str = "CellSocial_Heterogeneity";
    pub const MOLECULAR: &'static str = "Molecular_Heterogeneity";

    /// Picks the required metrics out of a parsed table.
    pub fn from_table(table: &HashMap<String, String>) -> Result<Self, ExtractError> {
        let get = |key: &str| {
            table
                .get(key)
                .cloned()
                .ok_or_else(|| ExtractError::MissingMetric {
                    key: key.to_string(),
                })
        };

        Ok(Self {
            cell_family: get(Self::CELL_FAMILY)?,
            cell_social: get(Self::CELL_SOCIAL)?,
            molecular: get(Self::MOLECULAR)?,
        })
    }
}

/// Parses a two-row tab-delimited table into a column → value map.
///
/// Only the first two lines are read; anything after them is ignored.
/// Values are kept verbatim.
pub fn parse_metrics_table(text: &str) -> Result<HashMap<String, String>, ExtractError> {
    let mut lines = text.lines();
    let (header, values) = match (lines.next(), lines.next()) {
        (Some(header), Some(values)) => (header, values),
        (Some(_), None) => return Err(ExtractError::MissingRows { found: 1 }),
        _ => return Err(ExtractError::MissingRows { found: 0 }),
    };

    let columns: Vec<&str> = header.split('\t').collect();
    let cells: Vec<&str> = values.split('\t').collect();
    if columns.len() != cells.len() {
        return Err(ExtractError::ColumnMismatch {
            header: columns.len(),
            values: cells.len(),
        });
    }

    Ok(columns
        .into_iter()
        .zip(cells)
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect())
}

/// Reads the heterogeneity output and resolves the nuclear image path.
pub async fn extract(
    store: &dyn DataStore,
    metrics_path: &Path,
    context: &RunContext,
) -> Result<ResultContext, PipelineError> {
    let text = tokio::fs::read_to_string(metrics_path)
        .await
        .map_err(|source| ExtractError::ReadFailed {
            path: metrics_path.to_path_buf(),
            source,
        })?;

    let table = parse_metrics_table(&text)?;
    debug!("Parsed {} heterogeneity columns", table.len());
    let metrics = HeterogeneityMetrics::from_table(&table)?;

    let nuclear_image = store
        .get_pathology_primary_path(&context.slide, &context.region, NUCLEAR_CHANNEL)
        .await
        .map_err(PipelineError::NuclearImageUnavailable)?;

    Ok(ResultContext {
        nuclear_image,
        metrics,
    })
}
