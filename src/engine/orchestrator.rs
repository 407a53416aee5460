//! Rule orchestrator: the engine's core state machine.
//!
//! One invocation walks LOADED → CONDITIONS_EVALUATED → {SKIPPED |
//! ACTION_DISPATCHED} → RECORDED. Every terminal transition writes exactly
//! one execution record, except the rule-not-found short-circuit, which
//! only records when `record_unmatched` is enabled.
//!
//! The orchestrator holds no locks; concurrent invocations for the same or
//! different rules race at the storage layer with last-writer-wins
//! semantics. The trigger payload and the loaded rule are immutable for
//! the duration of one invocation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::models::{ConditionSpec, ExecutionOutcome, ExecutionRecord, TriggerJob};
use crate::domain::ports::{ExecutionStore, RuleStore};
use crate::engine::actions::{ActionRegistry, TriggerContext};
use crate::engine::conditions;
use crate::engine::recorder::{ExecutionRecorder, RecorderError};

/// Terminal errors an execution can surface to the queue consumer.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Rule-author problem (bad action config, unregistered kind). Not
    /// worth redelivering.
    #[error("Action configuration invalid for rule {rule_id}: {message}")]
    Configuration { rule_id: Uuid, message: String },

    /// The handler's mutation failed. Recorded, then re-raised so the
    /// upstream retry policy applies.
    #[error("Action failed for rule {rule_id}: {message}")]
    Action { rule_id: Uuid, message: String },

    /// The audit write itself failed. The one error that may propagate
    /// without an execution record.
    #[error(transparent)]
    Recorder(#[from] RecorderError),

    /// Loading the rule failed.
    #[error("Rule store error for rule {rule_id}: {source}")]
    Store {
        rule_id: Uuid,
        #[source]
        source: DomainError,
    },

    /// The caller's deadline expired; a failure record was attempted first.
    #[error("Execution timed out for rule {rule_id} after {timeout_ms}ms")]
    Timeout { rule_id: Uuid, timeout_ms: u64 },
}

impl EngineError {
    /// Whether the consumer should redeliver the trigger.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Action { .. } | Self::Store { .. } | Self::Timeout { .. })
    }
}

/// Executes trigger jobs: load rule, evaluate conditions, dispatch the
/// action, record the outcome.
pub struct RuleOrchestrator {
    rules: Arc<dyn RuleStore>,
    registry: Arc<ActionRegistry>,
    recorder: ExecutionRecorder,
    record_unmatched: bool,
}

impl RuleOrchestrator {
    pub fn new(
        rules: Arc<dyn RuleStore>,
        registry: Arc<ActionRegistry>,
        executions: Arc<dyn ExecutionStore>,
    ) -> Self {
        Self {
            rules,
            registry,
            recorder: ExecutionRecorder::new(executions),
            record_unmatched: false,
        }
    }

    /// Also write skipped records for missing/inactive rules.
    pub fn with_record_unmatched(mut self, enabled: bool) -> Self {
        self.record_unmatched = enabled;
        self
    }

    /// Run one trigger job to a terminal state.
    pub async fn execute(&self, job: &TriggerJob) -> Result<ExecutionOutcome, EngineError> {
        let started = Instant::now();

        let rule = self
            .rules
            .find_by_id(job.rule_id)
            .await
            .map_err(|source| EngineError::Store { rule_id: job.rule_id, source })?;

        let rule = match rule {
            Some(rule) if rule.is_active() => rule,
            found => {
                let reason = if found.is_some() { "inactive" } else { "not found" };
                debug!(rule_id = %job.rule_id, reason, "Trigger skipped before evaluation");
                let elapsed = elapsed_ms(started);
                if self.record_unmatched {
                    self.recorder.record(&ExecutionRecord::skipped(job, elapsed)).await?;
                }
                return Ok(ExecutionOutcome::skipped(elapsed));
            }
        };

        // A malformed spec must not block the queue: treat it as "not
        // matched" and leave a trace for operators.
        let matched = match ConditionSpec::parse(&rule.conditions) {
            Ok(spec) => conditions::evaluate(&spec, &job.trigger_data),
            Err(err) => {
                warn!(
                    rule_id = %rule.id,
                    error = %err,
                    "Malformed condition spec treated as unmatched"
                );
                false
            }
        };

        if !matched {
            let elapsed = elapsed_ms(started);
            self.recorder.record(&ExecutionRecord::skipped(job, elapsed)).await?;
            debug!(rule_id = %rule.id, elapsed_ms = elapsed, "Conditions not met, action skipped");
            return Ok(ExecutionOutcome::skipped(elapsed));
        }

        let ctx = TriggerContext {
            trigger_type: job.trigger_type,
            payload: job.trigger_data.clone(),
            triggered_by: job.triggered_by,
        };

        match self.registry.dispatch(rule.action_kind, &rule.action_config, &ctx).await {
            Ok(result) if result.success => {
                let elapsed = elapsed_ms(started);
                let snapshot = result.to_value();
                self.recorder
                    .record(&ExecutionRecord::completed(job, snapshot.clone(), elapsed))
                    .await?;
                info!(
                    rule_id = %rule.id,
                    action = rule.action_kind.as_str(),
                    elapsed_ms = elapsed,
                    "Rule action executed"
                );
                Ok(ExecutionOutcome::completed(snapshot, elapsed))
            }
            Ok(result) => {
                let message = result
                    .error
                    .unwrap_or_else(|| "action handler reported failure".to_string());
                self.record_failure(job, &message, started).await;
                Err(EngineError::Action { rule_id: rule.id, message })
            }
            Err(err) => {
                let message = err.to_string();
                self.record_failure(job, &message, started).await;
                if err.is_configuration() {
                    Err(EngineError::Configuration { rule_id: rule.id, message })
                } else {
                    Err(EngineError::Action { rule_id: rule.id, message })
                }
            }
        }
    }

    /// Run one trigger job under an overall deadline. On expiry a failure
    /// record with error "timeout" is still attempted before the error
    /// propagates; a mutation already in flight is not cancelled cleanly
    /// and may have landed.
    pub async fn execute_with_timeout(
        &self,
        job: &TriggerJob,
        timeout: Duration,
    ) -> Result<ExecutionOutcome, EngineError> {
        let started = Instant::now();
        match tokio::time::timeout(timeout, self.execute(job)).await {
            Ok(result) => result,
            Err(_) => {
                let elapsed = elapsed_ms(started);
                // Best effort: the recorder logs its own failure.
                let _ = self
                    .recorder
                    .record(&ExecutionRecord::failed(job, "timeout", elapsed))
                    .await;
                Err(EngineError::Timeout {
                    rule_id: job.rule_id,
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
        }
    }

    /// Record a failed execution. On the failure path the action error is
    /// what the caller needs for retry policy, so a recorder error here is
    /// logged (inside the recorder, distinct target) but not propagated.
    async fn record_failure(&self, job: &TriggerJob, message: &str, started: Instant) {
        let record = ExecutionRecord::failed(job, message, elapsed_ms(started));
        let _ = self.recorder.record(&record).await;
    }
}

fn elapsed_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}
