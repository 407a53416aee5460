//! Execution recorder: the audit-trail write path.
//!
//! A thin wrapper over the `ExecutionStore` port whose only job is to make
//! audit-write failures a distinct, independently observable error. "Rule
//! failed" and "audit system down" must never look the same in logs.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::models::ExecutionRecord;
use crate::domain::ports::ExecutionStore;

/// An audit write failed. Distinct from action failure by type and by log
/// target (`flywheel::recorder`).
#[derive(Debug, Error)]
#[error("Execution record write failed for rule {rule_id}: {source}")]
pub struct RecorderError {
    pub rule_id: Uuid,
    #[source]
    pub source: DomainError,
}

/// Persists one record per orchestrator invocation.
#[derive(Clone)]
pub struct ExecutionRecorder {
    store: Arc<dyn ExecutionStore>,
}

impl ExecutionRecorder {
    pub fn new(store: Arc<dyn ExecutionStore>) -> Self {
        Self { store }
    }

    /// Append the record, surfacing store errors as `RecorderError`.
    pub async fn record(&self, record: &ExecutionRecord) -> Result<(), RecorderError> {
        self.store.create(record).await.map_err(|source| {
            let err = RecorderError { rule_id: record.rule_id, source };
            tracing::error!(
                target: "flywheel::recorder",
                rule_id = %record.rule_id,
                error = %err,
                "Audit write failed"
            );
            err
        })
    }
}
