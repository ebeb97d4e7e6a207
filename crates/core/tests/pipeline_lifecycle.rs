//! Pipeline lifecycle integration tests.
//!
//! These tests drive the MOHA pipeline with a mock data store and stage runner:
//! - Input resolution and the quant-not-found paths
//! - Fail-fast stage handling
//! - Publish policies per stage
//! - Metrics extraction and the final report

use std::sync::Arc;

use reqwest::StatusCode;
use tempfile::TempDir;

use moha_core::{
    pipeline::PipelineOutcome,
    testing::{fixtures, DataStoreOperation, MockDataStore, MockStageRunner},
    Config, MohaPipeline, PipelineState, PipelineStatus, RunContext, StageKind, Workspace,
};

const SLIDE: &str = "S1";
const REGION: &str = "006";
const BRANCH: &str = "0";

/// Test helper wiring the pipeline to mocks and a temporary workspace.
struct TestHarness {
    pipeline: MohaPipeline<MockDataStore, MockStageRunner>,
    store: MockDataStore,
    runner: MockStageRunner,
    temp_dir: TempDir,
}

impl TestHarness {
    async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    async fn with_config(mut config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        config.workspace.dir = temp_dir.path().join("data");

        let store = MockDataStore::new();
        let runner = MockStageRunner::new();
        store
            .add_quant_table(SLIDE, REGION, BRANCH, fixtures::QUANT_TABLE.as_bytes())
            .await;

        let pipeline =
            MohaPipeline::new(&config, Arc::new(store.clone()), Arc::new(runner.clone()));

        Self {
            pipeline,
            store,
            runner,
            temp_dir,
        }
    }

    fn workspace(&self) -> Workspace {
        Workspace::new(self.temp_dir.path().join("data"))
    }

    fn context() -> RunContext {
        RunContext::new(SLIDE, REGION, BRANCH)
    }

    async fn posted_names(&self) -> Vec<String> {
        self.store
            .recorded_posts()
            .await
            .into_iter()
            .map(|p| p.local_name)
            .collect()
    }

    async fn stage_counts(&self) -> [usize; 3] {
        [
            self.runner.invocation_count(StageKind::Thresholds).await,
            self.runner.invocation_count(StageKind::CellStates).await,
            self.runner.invocation_count(StageKind::Heterogeneity).await,
        ]
    }
}

fn failed_at(outcome: &PipelineOutcome) -> PipelineState {
    match outcome {
        PipelineOutcome::Failure { failed_at, .. } => *failed_at,
        other => panic!("expected failure, got {:?}", other),
    }
}

// =============================================================================
// Success path
// =============================================================================

#[tokio::test]
async fn test_full_run_succeeds() {
    let harness = TestHarness::new().await;

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;
    assert_eq!(outcome.status(), PipelineStatus::ExecutionFinishedSuccess);

    let report = outcome.into_report();
    assert_eq!(report.result.len(), 4);
    assert_eq!(
        report.result.get("nuclearImage").map(String::as_str),
        Some(MockDataStore::primary_path(SLIDE, REGION, "DAPI").as_str())
    );
    assert_eq!(
        report.result.get("CellFamily_Heterogeneity").map(String::as_str),
        Some("0.7312")
    );
    assert_eq!(
        report.result.get("CellSocial_Heterogeneity").map(String::as_str),
        Some("0.1864")
    );
    assert_eq!(
        report.result.get("Molecular_Heterogeneity").map(String::as_str),
        Some("1.9021")
    );
    assert_eq!(harness.stage_counts().await, [1, 1, 1]);
}

#[tokio::test]
async fn test_outputs_published_in_stage_order() {
    let harness = TestHarness::new().await;
    harness.pipeline.execute(&TestHarness::context()).await;

    assert_eq!(
        harness.posted_names().await,
        vec![
            "quant_006.csv.thresholds.txt",
            "quant_006.csv.MarkerStates.txt",
            "quant_006.csv.MarkerIndex.txt",
            "out_moha_006.txt",
        ]
    );

    let expected_remote = MockDataStore::result_path(SLIDE, REGION, BRANCH, "MOHA");
    for post in harness.store.recorded_posts().await {
        assert_eq!(post.remote_path, expected_remote);
        assert_eq!(post.format, "csv");
        assert!(!post.force);
        assert!(post.content.is_some(), "{} was not on disk", post.local_name);
    }
}

#[tokio::test]
async fn test_calls_happen_in_order() {
    let harness = TestHarness::new().await;
    harness.pipeline.execute(&TestHarness::context()).await;

    let calls = harness.store.calls().await;
    assert_eq!(
        calls,
        vec![
            "get_pathology_result_image_path",
            "get_instance",
            "get_pathology_result_path",
            "post_instance",
            "post_instance",
            "post_instance",
            "post_instance",
            "get_pathology_primary_path",
        ]
    );
}

#[tokio::test]
async fn test_stages_read_previous_outputs() {
    let harness = TestHarness::new().await;
    harness.pipeline.execute(&TestHarness::context()).await;

    let workspace = harness.workspace();
    let stages = harness.runner.recorded_stages().await;
    assert!(stages.iter().all(|s| s.success));

    let quant = workspace.path("quant_006.csv");
    assert_eq!(
        stages[0].command.args[0],
        format!("-computeThresholds={}", quant.display())
    );
    assert_eq!(
        stages[1].command.args[1],
        format!("-thresholdFile={}", workspace.path("quant_006.csv.thresholds.txt").display())
    );
    assert_eq!(
        stages[2].command.args[0],
        format!(
            "-computeHeterogeneity={}",
            workspace.path("quant_006.csv.MarkerStates.txt").display()
        )
    );
}

#[tokio::test]
async fn test_force_flag_reaches_every_upload() {
    let harness = TestHarness::new().await;
    let context = TestHarness::context().with_force(true);

    harness.pipeline.execute(&context).await;

    let posts = harness.store.recorded_posts().await;
    assert_eq!(posts.len(), 4);
    assert!(posts.iter().all(|p| p.force));
}

#[tokio::test]
async fn test_rerun_with_force_is_idempotent() {
    let harness = TestHarness::new().await;
    let context = TestHarness::context().with_force(true);

    let first = harness.pipeline.execute(&context).await.into_report();
    let second = harness.pipeline.execute(&context).await.into_report();

    assert_eq!(first, second);
    assert_eq!(harness.store.recorded_posts().await.len(), 8);
}

#[tokio::test]
async fn test_workspace_is_cleared_before_run() {
    let harness = TestHarness::new().await;
    let workspace = harness.workspace();
    std::fs::create_dir_all(workspace.dir()).unwrap();
    std::fs::write(workspace.path("stale.txt"), b"old").unwrap();
    std::fs::create_dir_all(workspace.path("old_run")).unwrap();
    std::fs::write(workspace.path("old_run/out.txt"), b"old").unwrap();

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;
    assert!(outcome.status().is_success());

    assert!(!workspace.path("stale.txt").exists());
    assert!(!workspace.path("old_run").exists());
    assert!(workspace.path("out_moha_006.txt").exists());
}

// =============================================================================
// Input resolution
// =============================================================================

#[tokio::test]
async fn test_missing_quant_table() {
    let harness = TestHarness::new().await;
    let context = RunContext::new(SLIDE, "999", BRANCH);

    let outcome = harness.pipeline.execute(&context).await;

    assert_eq!(outcome.status(), PipelineStatus::ErrorQuantFileNotFound);
    assert_eq!(failed_at(&outcome), PipelineState::Init);
    assert_eq!(harness.stage_counts().await, [0, 0, 0]);
    assert!(harness.store.recorded_posts().await.is_empty());
    assert!(outcome.into_report().result.is_empty());
}

#[tokio::test]
async fn test_failed_download_is_quant_not_found() {
    let harness = TestHarness::new().await;
    harness
        .store
        .set_get_status(StatusCode::INTERNAL_SERVER_ERROR)
        .await;

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;

    assert_eq!(outcome.status(), PipelineStatus::ErrorQuantFileNotFound);
    assert_eq!(harness.stage_counts().await, [0, 0, 0]);
}

#[tokio::test]
async fn test_lookup_transport_error_is_quant_not_found() {
    let harness = TestHarness::new().await;
    harness
        .store
        .set_failing(DataStoreOperation::ResultImagePath)
        .await;

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;
    assert_eq!(outcome.status(), PipelineStatus::ErrorQuantFileNotFound);
}

#[tokio::test]
async fn test_output_path_failure_stops_before_stages() {
    let harness = TestHarness::new().await;
    harness.store.set_failing(DataStoreOperation::ResultPath).await;

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;

    assert_eq!(outcome.status(), PipelineStatus::ExecutionError);
    assert_eq!(failed_at(&outcome), PipelineState::InputResolved);
    assert_eq!(harness.stage_counts().await, [0, 0, 0]);
}

// =============================================================================
// Stage failures
// =============================================================================

#[tokio::test]
async fn test_threshold_stage_failure() {
    let harness = TestHarness::new().await;
    harness.runner.set_exit_code(StageKind::Thresholds, 1).await;

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;

    assert_eq!(outcome.status(), PipelineStatus::ExecutionFinishedError);
    assert_eq!(failed_at(&outcome), PipelineState::InputResolved);
    assert_eq!(harness.stage_counts().await, [1, 0, 0]);
    assert!(harness.store.recorded_posts().await.is_empty());
}

#[tokio::test]
async fn test_cell_state_stage_failure_skips_heterogeneity() {
    let harness = TestHarness::new().await;
    harness.runner.set_exit_code(StageKind::CellStates, 2).await;

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;

    assert_eq!(outcome.status(), PipelineStatus::ExecutionFinishedError);
    assert_eq!(failed_at(&outcome), PipelineState::Stage1Done);
    assert_eq!(harness.stage_counts().await, [1, 1, 0]);
    assert_eq!(
        harness.posted_names().await,
        vec!["quant_006.csv.thresholds.txt"]
    );

    match outcome {
        PipelineOutcome::Failure { reason, .. } => {
            assert!(reason.starts_with("cell_states stage failed: 2 - "), "{}", reason);
        }
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_heterogeneity_stage_failure() {
    let harness = TestHarness::new().await;
    harness.runner.set_exit_code(StageKind::Heterogeneity, 1).await;

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;

    assert_eq!(outcome.status(), PipelineStatus::ExecutionFinishedError);
    assert_eq!(failed_at(&outcome), PipelineState::Stage2Done);
    assert_eq!(harness.store.recorded_posts().await.len(), 3);
}

// =============================================================================
// Publish policies
// =============================================================================

#[tokio::test]
async fn test_forbidden_threshold_publish_stops_run() {
    let harness = TestHarness::new().await;
    harness
        .store
        .set_post_status("quant_006.csv.thresholds.txt", StatusCode::FORBIDDEN)
        .await;

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;

    assert_eq!(outcome.status(), PipelineStatus::ExecutionError);
    assert_eq!(failed_at(&outcome), PipelineState::InputResolved);
    assert_eq!(harness.stage_counts().await, [1, 0, 0]);
}

#[tokio::test]
async fn test_forbidden_cell_state_publish_is_tolerated() {
    let harness = TestHarness::new().await;
    harness
        .store
        .set_post_status("quant_006.csv.MarkerStates.txt", StatusCode::FORBIDDEN)
        .await;
    harness
        .store
        .set_post_status("quant_006.csv.MarkerIndex.txt", StatusCode::FORBIDDEN)
        .await;

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;

    assert_eq!(outcome.status(), PipelineStatus::ExecutionFinishedSuccess);
    assert_eq!(harness.stage_counts().await, [1, 1, 1]);
}

#[tokio::test]
async fn test_gated_cell_state_publish_stops_run() {
    let mut config = Config::default();
    config.pipeline.gate_cell_state_publish = true;
    let harness = TestHarness::with_config(config).await;
    harness
        .store
        .set_post_status("quant_006.csv.MarkerIndex.txt", StatusCode::FORBIDDEN)
        .await;

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;

    assert_eq!(outcome.status(), PipelineStatus::ExecutionError);
    assert_eq!(failed_at(&outcome), PipelineState::Stage1Done);
    assert_eq!(harness.stage_counts().await, [1, 1, 0]);
}

#[tokio::test]
async fn test_forbidden_heterogeneity_publish_stops_run() {
    let harness = TestHarness::new().await;
    harness
        .store
        .set_post_status("out_moha_006.txt", StatusCode::FORBIDDEN)
        .await;

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;

    assert_eq!(outcome.status(), PipelineStatus::ExecutionError);
    assert_eq!(failed_at(&outcome), PipelineState::Stage2Done);
    assert!(!harness.store.calls().await.contains(&"get_pathology_primary_path"));
}

#[tokio::test]
async fn test_upload_transport_failure_on_gated_stage() {
    let harness = TestHarness::new().await;
    harness
        .store
        .set_failing(DataStoreOperation::PostInstance)
        .await;

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;

    assert_eq!(outcome.status(), PipelineStatus::ExecutionError);
    assert_eq!(harness.stage_counts().await, [1, 0, 0]);
}

// =============================================================================
// Extraction
// =============================================================================

#[tokio::test]
async fn test_metrics_values_are_kept_verbatim() {
    let harness = TestHarness::new().await;
    harness
        .runner
        .set_metrics(fixtures::metrics_table("1.50E-01", "NaN", " 2"))
        .await;

    let report = harness
        .pipeline
        .execute(&TestHarness::context())
        .await
        .into_report();

    assert_eq!(report.status, PipelineStatus::ExecutionFinishedSuccess);
    assert_eq!(report.result["CellFamily_Heterogeneity"], "1.50E-01");
    assert_eq!(report.result["CellSocial_Heterogeneity"], "NaN");
    assert_eq!(report.result["Molecular_Heterogeneity"], " 2");
}

#[tokio::test]
async fn test_missing_metric_column() {
    let harness = TestHarness::new().await;
    harness
        .runner
        .set_metrics("CellFamily_Heterogeneity\tMolecular_Heterogeneity\n0.1\t0.2\n")
        .await;

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;

    assert_eq!(outcome.status(), PipelineStatus::ExecutionError);
    assert_eq!(failed_at(&outcome), PipelineState::Stage3Done);
}

#[tokio::test]
async fn test_metrics_without_value_row() {
    let harness = TestHarness::new().await;
    harness
        .runner
        .set_metrics("CellFamily_Heterogeneity\tCellSocial_Heterogeneity\tMolecular_Heterogeneity\n")
        .await;

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;
    assert_eq!(outcome.status(), PipelineStatus::ExecutionError);
}

#[tokio::test]
async fn test_nuclear_image_failure() {
    let harness = TestHarness::new().await;
    harness.store.set_failing(DataStoreOperation::PrimaryPath).await;

    let outcome = harness.pipeline.execute(&TestHarness::context()).await;

    assert_eq!(outcome.status(), PipelineStatus::ExecutionError);
    assert_eq!(failed_at(&outcome), PipelineState::Stage3Done);
    assert!(outcome.into_report().result.is_empty());
}

// =============================================================================
// Entry point
// =============================================================================

#[tokio::test]
async fn test_run_returns_report() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.workspace.dir = temp_dir.path().to_path_buf();

    let store = MockDataStore::new();
    store
        .add_quant_table(SLIDE, REGION, BRANCH, fixtures::QUANT_TABLE.as_bytes())
        .await;
    let runner = MockStageRunner::new();

    let report = moha_core::run(
        Arc::new(store),
        Arc::new(runner),
        &config,
        &TestHarness::context(),
    )
    .await;

    assert_eq!(report.status, PipelineStatus::ExecutionFinishedSuccess);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "EXECUTION_FINISHED_SUCCESS");
    assert_eq!(json["result"]["Molecular_Heterogeneity"], "1.9021");
}
