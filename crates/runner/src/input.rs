//! Reading the run context handed to the adaptor.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

use moha_core::RunContext;

/// Reads the context JSON from `path`, or from stdin when no path is given.
pub async fn read_context(path: Option<&Path>) -> Result<RunContext> {
    let text = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?,
        None => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read stdin")?;
            text
        }
    };
    parse_context(&text)
}

/// Parses a context JSON document.
pub fn parse_context(text: &str) -> Result<RunContext> {
    serde_json::from_str(text).context("Invalid run context JSON")
}
