//! Process-based MOHA tool runner.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::ToolConfig;

use super::error::ToolError;
use super::traits::StageRunner;
use super::types::StageCommand;

/// Number of trailing stderr lines kept for diagnostics.
const STDERR_TAIL_LINES: usize = 20;

/// Runs MOHA tool stages as child processes.
///
/// Arguments are passed to the process directly, never through a shell.
pub struct MohaTool {
    config: ToolConfig,
}

impl MohaTool {
    /// Creates a new runner with the given configuration.
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    /// Creates a runner with default configuration (`java -jar MOHAtool.jar`).
    pub fn with_defaults() -> Self {
        Self::new(ToolConfig::default())
    }

    /// Full argument vector for a stage, program arguments first.
    fn build_args(&self, command: &StageCommand) -> Vec<String> {
        let mut args = self.config.program_args.clone();
        args.extend(command.args.iter().cloned());
        args
    }

    /// Human-readable command line used in logs and errors.
    fn command_line(&self, args: &[String]) -> String {
        let mut line = self.config.program.to_string_lossy().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    fn stderr_tail(stderr: &[u8]) -> Option<String> {
        let text = String::from_utf8_lossy(stderr);
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return None;
        }
        let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
        Some(lines[start..].join("\n"))
    }
}

#[async_trait]
impl StageRunner for MohaTool {
    fn name(&self) -> &str {
        "moha"
    }

    async fn run_stage(&self, command: &StageCommand) -> Result<(), ToolError> {
        let args = self.build_args(command);
        let command_line = self.command_line(&args);
        debug!("Running {} stage: {}", command.stage, command_line);

        let start = Instant::now();
        let mut process = Command::new(&self.config.program);
        process
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.config.working_dir {
            process.current_dir(dir);
        }

        let output = process.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ToolError::ProgramNotFound {
                    path: self.config.program.clone(),
                }
            } else {
                ToolError::LaunchFailed {
                    command: command_line.clone(),
                    source: e,
                }
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            debug!("[{}] {}", command.stage, line);
        }

        if !output.status.success() {
            let stderr = Self::stderr_tail(&output.stderr);
            if let Some(ref tail) = stderr {
                warn!("{} stage stderr:\n{}", command.stage, tail);
            }
            return Err(ToolError::command_failed(
                output.status.code().unwrap_or(-1),
                command_line,
                stderr,
            ));
        }

        debug!(
            "{} stage finished in {} ms",
            command.stage,
            start.elapsed().as_millis()
        );
        Ok(())
    }
}
