//! One-shot trigger execution CLI command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{ExecutionOutcome, TriggerJob};

#[derive(Args, Debug)]
pub struct TriggerArgs {
    /// Path to a JSON file containing one trigger job
    pub file: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct TriggerOutput {
    pub outcome: ExecutionOutcome,
}

impl CommandOutput for TriggerOutput {
    fn to_human(&self) -> String {
        let state = if self.outcome.skipped {
            "skipped"
        } else if self.outcome.success {
            "success"
        } else {
            "failure"
        };
        let mut lines = vec![
            format!("Execution {state} in {}ms", self.outcome.execution_time_ms),
        ];
        if let Some(result) = &self.outcome.result {
            lines.push(format!(
                "Result: {}",
                serde_json::to_string_pretty(result).unwrap_or_default()
            ));
        }
        if let Some(error) = &self.outcome.error {
            lines.push(format!("Error: {error}"));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.outcome).unwrap_or_default()
    }
}

pub async fn execute(args: TriggerArgs, json_mode: bool) -> Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let job: TriggerJob = serde_json::from_str(&raw).context("Failed to parse trigger job")?;

    let (config, pool) = super::open_database().await?;
    let orchestrator = super::build_orchestrator(&config, &pool);
    let timeout = Duration::from_secs(config.worker.execution_timeout_secs);

    let started = std::time::Instant::now();
    let outcome = match orchestrator.execute_with_timeout(&job, timeout).await {
        Ok(outcome) => outcome,
        // Failures are recorded and re-raised by the engine; the operator
        // sees them as a failed outcome rather than a stack of context.
        Err(err) => ExecutionOutcome::failed(
            err.to_string(),
            i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX),
        ),
    };
    output(&TriggerOutput { outcome }, json_mode);

    Ok(())
}
