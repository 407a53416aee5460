//! Worker replay CLI command.
//!
//! Feeds a JSONL stream of trigger jobs through the consumer, the same
//! code path a host embeds behind its real queue transport. Useful for
//! draining a dead-letter dump or re-running an exported job batch.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::TriggerJob;
use crate::engine::TriggerConsumer;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to a JSONL file with one trigger job per line
    pub file: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct RunOutput {
    pub jobs: usize,
    pub skipped_lines: usize,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let mut message = format!("Processed {} trigger job(s)", self.jobs);
        if self.skipped_lines > 0 {
            message.push_str(&format!(" ({} malformed line(s) skipped)", self.skipped_lines));
        }
        message
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RunArgs, json_mode: bool) -> Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let (config, pool) = super::open_database().await?;
    let orchestrator = super::build_orchestrator(&config, &pool);
    let consumer = TriggerConsumer::new(orchestrator, config.worker.clone());

    let (tx, rx) = mpsc::channel::<TriggerJob>(64);
    let mut jobs = 0usize;
    let mut skipped_lines = 0usize;

    let feed = async {
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<TriggerJob>(line) {
                Ok(job) => {
                    jobs += 1;
                    if tx.send(job).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    skipped_lines += 1;
                    tracing::warn!(error = %err, "Skipping malformed job line");
                }
            }
        }
        drop(tx);
    };

    tokio::join!(feed, consumer.run(rx));

    output(&RunOutput { jobs, skipped_lines }, json_mode);
    Ok(())
}
