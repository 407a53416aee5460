use crate::domain::errors::DomainResult;
use crate::domain::models::ExecutionRecord;
use async_trait::async_trait;
use uuid::Uuid;

/// Store port for the execution audit trail. Append-only: records are
/// created by the orchestrator and never mutated.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    /// Append one execution record.
    async fn create(&self, record: &ExecutionRecord) -> DomainResult<()>;

    /// Recent executions for a rule, newest first.
    async fn list_for_rule(&self, rule_id: Uuid, limit: i64) -> DomainResult<Vec<ExecutionRecord>>;
}
