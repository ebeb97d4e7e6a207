mod input;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moha_core::{load_config, run as run_pipeline, validate_config, HttpDataStore, MohaTool};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            // Logging may not be initialized yet if configuration failed.
            error!("Fatal error: {:#}", e);
            eprintln!("moha-adaptor: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Runs one pipeline invocation. Returns whether it succeeded.
async fn run() -> Result<bool> {
    // Determine config path
    let config_path = std::env::var("MOHA_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("moha.toml"));

    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Initialize logging. Stdout carries the report, so logs go to stderr.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    if config.logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    info!("moha-adaptor {} starting", VERSION);
    info!("Configuration loaded from {:?}", config_path);

    validate_config(&config).context("Configuration validation failed")?;
    info!("Workspace: {:?}", config.workspace.dir);
    info!("Data store: {}", config.datastore.url);

    let context_path = std::env::args().nth(1).map(PathBuf::from);
    let context = input::read_context(context_path.as_deref())
        .await
        .context("Failed to read run context")?;

    let store = Arc::new(
        HttpDataStore::new(config.datastore.clone()).context("Failed to create data store client")?,
    );
    let tool = Arc::new(MohaTool::new(config.tool.clone()));

    let report = run_pipeline(store, tool, &config, &context).await;
    let success = report.status.is_success();

    println!(
        "{}",
        serde_json::to_string(&report).context("Failed to serialize run report")?
    );
    info!("Run finished with status {}", report.status);

    Ok(success)
}
