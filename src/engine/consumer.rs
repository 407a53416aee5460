//! Trigger consumer: the worker loop a host embeds.
//!
//! The upstream queue transport is external; this consumer drains
//! `TriggerJob`s from an in-process channel the transport feeds, bounds
//! concurrency with a semaphore, and applies the caller-side retry policy
//! the orchestrator deliberately leaves to its caller: retryable failures
//! (action, store, timeout) are redelivered with exponential backoff,
//! configuration and recorder failures are logged and dropped.

use std::sync::Arc;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::domain::models::{TriggerJob, WorkerConfig};
use crate::engine::orchestrator::{EngineError, RuleOrchestrator};

/// Drains trigger jobs from a channel and executes them concurrently.
pub struct TriggerConsumer {
    orchestrator: Arc<RuleOrchestrator>,
    config: WorkerConfig,
}

impl TriggerConsumer {
    pub fn new(orchestrator: Arc<RuleOrchestrator>, config: WorkerConfig) -> Self {
        Self { orchestrator, config }
    }

    /// Process jobs until the sending side closes the channel, then drain
    /// in-flight work.
    pub async fn run(&self, mut jobs: mpsc::Receiver<TriggerJob>) {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut in_flight = JoinSet::new();

        while let Some(job) = jobs.recv().await {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                // Semaphore closed: shutting down.
                break;
            };
            let orchestrator = self.orchestrator.clone();
            let config = self.config.clone();
            in_flight.spawn(async move {
                let _permit = permit;
                process_job(&orchestrator, &config, &job).await;
            });

            // Reap without blocking intake.
            while in_flight.try_join_next().is_some() {}
        }

        while in_flight.join_next().await.is_some() {}
    }
}

/// Execute one delivery, retrying retryable failures with exponential
/// backoff. Each attempt produces its own execution record; dedup is
/// explicitly not a guarantee of this engine.
async fn process_job(orchestrator: &RuleOrchestrator, config: &WorkerConfig, job: &TriggerJob) {
    let timeout = Duration::from_secs(config.execution_timeout_secs);
    let mut policy = ExponentialBackoff {
        initial_interval: Duration::from_millis(config.initial_backoff_ms),
        max_interval: Duration::from_millis(config.max_backoff_ms),
        max_elapsed_time: None,
        ..ExponentialBackoff::default()
    };
    let mut attempts: u32 = 0;

    loop {
        match orchestrator.execute_with_timeout(job, timeout).await {
            Ok(outcome) => {
                debug!(
                    rule_id = %job.rule_id,
                    skipped = outcome.skipped,
                    elapsed_ms = outcome.execution_time_ms,
                    "Trigger job finished"
                );
                return;
            }
            Err(err) if err.is_retryable() && attempts < config.max_retries => {
                attempts += 1;
                let delay = policy
                    .next_backoff()
                    .unwrap_or(Duration::from_millis(config.max_backoff_ms));
                warn!(
                    rule_id = %job.rule_id,
                    attempt = attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "Retrying trigger job"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err @ EngineError::Configuration { .. }) => {
                // Rule-author problem; redelivery cannot fix it.
                warn!(rule_id = %job.rule_id, error = %err, "Trigger job dropped");
                return;
            }
            Err(err @ EngineError::Recorder(_)) => {
                // Already logged under flywheel::recorder with its own
                // target; do not retry into a broken audit store.
                error!(rule_id = %job.rule_id, error = %err, "Trigger job abandoned");
                return;
            }
            Err(err) => {
                error!(
                    rule_id = %job.rule_id,
                    attempts,
                    error = %err,
                    "Trigger job failed, retries exhausted"
                );
                return;
            }
        }
    }
}
