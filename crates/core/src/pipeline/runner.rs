//! Pipeline orchestrator implementation.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::config::{Config, PipelineConfig, ToolConfig};
use crate::datastore::{DataStore, MOHA_TAG};
use crate::tool::StageRunner;
use crate::workspace::Workspace;

use super::error::PipelineError;
use super::extract::extract;
use super::publish::PublishTarget;
use super::resolve::resolve_and_fetch;
use super::stages::{plan_stages, StageDescriptor};
use super::types::{PipelineOutcome, PipelineState, ResultContext, RunContext, RunReport};

/// Runs the MOHA analysis for one region at a time.
pub struct MohaPipeline<D: DataStore, R: StageRunner> {
    store: Arc<D>,
    runner: Arc<R>,
    workspace: Workspace,
    tool: ToolConfig,
    settings: PipelineConfig,
}

impl<D: DataStore + 'static, R: StageRunner + 'static> MohaPipeline<D, R> {
    /// Creates a pipeline using the workspace, tool and pipeline sections of
    /// `config`.
    pub fn new(config: &Config, store: Arc<D>, runner: Arc<R>) -> Self {
        Self {
            store,
            runner,
            workspace: Workspace::new(config.workspace.dir.clone()),
            tool: config.tool.clone(),
            settings: config.pipeline.clone(),
        }
    }

    /// Replaces the scratch workspace.
    pub fn with_workspace(mut self, workspace: Workspace) -> Self {
        self.workspace = workspace;
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Runs the full pipeline for `context`.
    ///
    /// Never panics on collaborator failures: every error becomes a
    /// [`PipelineOutcome::Failure`] with its status.
    pub async fn execute(&self, context: &RunContext) -> PipelineOutcome {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "moha_run",
            run_id = %run_id,
            slide = %context.slide,
            region = %context.region,
            branch = %context.branch
        );

        async {
            info!(
                "Starting MOHA run (force={}, store={}, runner={})",
                context.force,
                self.store.name(),
                self.runner.name()
            );
            let start = Instant::now();
            let mut state = PipelineState::Init;

            match self.run_steps(context, &mut state).await {
                Ok(result) => {
                    info!(
                        "MOHA run finished successfully in {} ms",
                        start.elapsed().as_millis()
                    );
                    PipelineOutcome::Success { result }
                }
                Err(e) => {
                    let status = e.status();
                    let failed_at = state;
                    advance(&mut state, PipelineState::Failed(status));
                    error!("MOHA run failed after {}: {}", failed_at, e);
                    PipelineOutcome::Failure {
                        status,
                        failed_at,
                        reason: e.to_string(),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_steps(
        &self,
        context: &RunContext,
        state: &mut PipelineState,
    ) -> Result<ResultContext, PipelineError> {
        let store: &dyn DataStore = &*self.store;

        self.workspace.prepare().await?;
        let files = self.workspace.region_files(&context.region);

        resolve_and_fetch(store, &self.workspace, context).await?;
        advance(state, PipelineState::InputResolved);

        let remote_path = store
            .get_pathology_result_path(&context.slide, &context.region, &context.branch, MOHA_TAG)
            .await
            .map_err(PipelineError::OutputPathUnavailable)?;
        let target = PublishTarget {
            remote_path,
            format: self.settings.output_format.clone(),
            force: context.force,
        };

        for stage in plan_stages(&self.workspace, &files, &self.tool, &self.settings) {
            self.run_stage(&stage, &target).await?;
            advance(state, PipelineState::after_stage(stage.command.stage));
        }

        let metrics_path = self.workspace.path(&files.heterogeneity);
        let result = extract(store, &metrics_path, context).await?;
        advance(state, PipelineState::Extracted);

        Ok(result)
    }

    /// Runs one stage, then publishes each of its outputs in order.
    async fn run_stage(
        &self,
        stage: &StageDescriptor,
        target: &PublishTarget,
    ) -> Result<(), PipelineError> {
        let kind = stage.command.stage;
        let start = Instant::now();
        info!("Running {} stage", kind);

        self.runner
            .run_stage(&stage.command)
            .await
            .map_err(|source| PipelineError::StageFailed {
                stage: kind,
                source,
            })?;
        info!("{} stage done in {} ms", kind, start.elapsed().as_millis());

        for name in &stage.publish {
            target
                .publish_with_policy(&*self.store, &self.workspace, name, stage.policy)
                .await?;
        }

        Ok(())
    }
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    info!("Pipeline state {} -> {}", state, next);
    *state = next;
}

/// Runs one invocation and returns the caller-facing report.
pub async fn run<D, R>(store: Arc<D>, runner: Arc<R>, config: &Config, context: &RunContext) -> RunReport
where
    D: DataStore + 'static,
    R: StageRunner + 'static,
{
    MohaPipeline::new(config, store, runner)
        .execute(context)
        .await
        .into_report()
}
