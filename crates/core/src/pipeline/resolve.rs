//! Input resolution: locate and download the quantification table.

use reqwest::StatusCode;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::datastore::{DataStore, QUANT_FORMAT, QUANT_TAG};
use crate::workspace::Workspace;

use super::error::PipelineError;
use super::types::RunContext;

/// Resolves the region's quantification table and downloads it into the
/// workspace, returning the local path.
///
/// A missing artifact, a failed lookup and a failed download all collapse to
/// [`PipelineError::QuantFileNotFound`].
pub async fn resolve_and_fetch(
    store: &dyn DataStore,
    workspace: &Workspace,
    context: &RunContext,
) -> Result<PathBuf, PipelineError> {
    let remote_path = store
        .get_pathology_result_image_path(&context.slide, &context.region, &context.branch, QUANT_TAG)
        .await
        .map_err(|e| PipelineError::quant_not_found(format!("lookup failed: {}", e)))?
        .ok_or_else(|| {
            PipelineError::quant_not_found(format!(
                "no {} result for slide {} region {} branch {}",
                QUANT_TAG, context.slide, context.region, context.branch
            ))
        })?;
    debug!("Quantification table resolved to {}", remote_path);

    let local_name = workspace.region_files(&context.region).quant;
    let status = store
        .get_instance(&remote_path, workspace.dir(), &local_name, QUANT_FORMAT)
        .await
        .map_err(|e| PipelineError::quant_not_found(format!("download failed: {}", e)))?;

    if status != StatusCode::OK {
        return Err(PipelineError::quant_not_found(format!(
            "download of {} returned {}",
            remote_path, status
        )));
    }

    let local_path = workspace.path(&local_name);
    info!("Fetched {} into {:?}", remote_path, local_path);
    Ok(local_path)
}
