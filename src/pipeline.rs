//! The external corpus-rebuild collaborator.
//!
//! Regenerating the corpus file is an out-of-process pipeline the engine only
//! ever sees through [`CorpusPipeline`]: invoke, wait, observe one of three
//! outcomes. Nothing here assumes in-process execution.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::{PipelineConfig, PipelineStage};

/// Captured stage output is truncated to this size.
const MAX_OUTPUT_BYTES: usize = 1_048_576; // 1 MB

/// Terminal state of one rebuild invocation.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// All stages exited zero; the corpus file is safe to re-read.
    Success { stdout: String },
    /// A stage exited non-zero or could not be spawned.
    Failed {
        exit_code: Option<i32>,
        diagnostics: String,
    },
    /// A stage exceeded its wall-clock budget.
    TimedOut { limit: Duration },
}

/// The engine's only view of the rebuild collaborator.
#[async_trait]
pub trait CorpusPipeline: Send + Sync {
    async fn run(&self) -> PipelineOutcome;
}

/// Runs the configured commands sequentially as child processes. The first
/// stage that fails or times out aborts the run.
pub struct ProcessPipeline {
    config: PipelineConfig,
}

impl ProcessPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    async fn run_stage(&self, stage: &PipelineStage) -> PipelineOutcome {
        let mut cmd = Command::new(&stage.command);
        cmd.args(&stage.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.config.working_dir {
            cmd.current_dir(dir);
        }

        let limit = Duration::from_secs(self.config.timeout_secs);
        let output = match timeout(limit, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return PipelineOutcome::Failed {
                    exit_code: None,
                    diagnostics: format!("failed to spawn '{}': {}", stage.command, e),
                };
            }
            Err(_) => {
                warn!(command = %stage.command, ?limit, "pipeline stage timed out");
                return PipelineOutcome::TimedOut { limit };
            }
        };

        let stdout = truncated_utf8(&output.stdout);
        if output.status.success() {
            info!(command = %stage.command, "pipeline stage finished");
            PipelineOutcome::Success { stdout }
        } else {
            let diagnostics = truncated_utf8(&output.stderr);
            warn!(command = %stage.command, exit_code = ?output.status.code(),
                "pipeline stage failed");
            PipelineOutcome::Failed {
                exit_code: output.status.code(),
                diagnostics,
            }
        }
    }
}

#[async_trait]
impl CorpusPipeline for ProcessPipeline {
    async fn run(&self) -> PipelineOutcome {
        let mut combined_stdout = String::new();

        for stage in &self.config.stages {
            match self.run_stage(stage).await {
                PipelineOutcome::Success { stdout } => {
                    combined_stdout.push_str(&stdout);
                }
                other => return other,
            }
        }

        PipelineOutcome::Success {
            stdout: combined_stdout,
        }
    }
}

fn truncated_utf8(bytes: &[u8]) -> String {
    String::from_utf8_lossy(&bytes[..bytes.len().min(MAX_OUTPUT_BYTES)]).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(stages: Vec<PipelineStage>) -> PipelineConfig {
        PipelineConfig {
            stages,
            working_dir: None,
            timeout_secs: 10,
        }
    }

    fn stage(command: &str, args: &[&str]) -> PipelineStage {
        PipelineStage {
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn successful_stages_run_in_sequence() {
        let pipeline = ProcessPipeline::new(config(vec![
            stage("true", &[]),
            stage("echo", &["done"]),
        ]));
        match pipeline.run().await {
            PipelineOutcome::Success { stdout } => assert!(stdout.contains("done")),
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn failing_stage_aborts_the_run() {
        let pipeline = ProcessPipeline::new(config(vec![stage("false", &[])]));
        match pipeline.run().await {
            PipelineOutcome::Failed { exit_code, .. } => assert_eq!(exit_code, Some(1)),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unknown_command_reports_spawn_diagnostics() {
        let pipeline =
            ProcessPipeline::new(config(vec![stage("definitely-not-a-real-command", &[])]));
        match pipeline.run().await {
            PipelineOutcome::Failed {
                exit_code,
                diagnostics,
            } => {
                assert_eq!(exit_code, None);
                assert!(diagnostics.contains("failed to spawn"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn slow_stage_times_out() {
        let mut cfg = config(vec![stage("sleep", &["5"])]);
        cfg.timeout_secs = 1;
        let pipeline = ProcessPipeline::new(cfg);
        assert!(matches!(
            pipeline.run().await,
            PipelineOutcome::TimedOut { .. }
        ));
    }
}
