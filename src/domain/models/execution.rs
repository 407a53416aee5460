//! Trigger jobs and the execution audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::rule::TriggerType;

/// A trigger event as delivered by the upstream queue.
///
/// Delivery is at-least-once and possibly out of order; every delivery is
/// processed independently and produces its own [`ExecutionRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerJob {
    pub rule_id: Uuid,
    pub trigger_type: TriggerType,
    /// Event payload; fields are resolved by dot-path during evaluation.
    #[serde(default)]
    pub trigger_data: Value,
    /// The member whose action produced the event, if any.
    #[serde(rename = "triggeredById", default, skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<Uuid>,
}

impl TriggerJob {
    pub fn new(rule_id: Uuid, trigger_type: TriggerType, trigger_data: Value) -> Self {
        Self { rule_id, trigger_type, trigger_data, triggered_by: None }
    }

    pub fn with_triggered_by(mut self, member_id: Uuid) -> Self {
        self.triggered_by = Some(member_id);
        self
    }
}

/// One audit row per orchestrator invocation. Append-only, never mutated.
///
/// Skips are not failures: a skipped record carries `success = true` and no
/// `action_result`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: Uuid,
    pub rule_id: Uuid,
    pub trigger_type: TriggerType,
    /// Snapshot of the payload the rule was evaluated against.
    pub trigger_payload: Value,
    /// The handler's result snapshot; `None` on skip and on failure.
    pub action_result: Option<Value>,
    pub success: bool,
    pub skipped: bool,
    pub error_message: Option<String>,
    /// Measured from rule-load to terminal state, dispatch included.
    pub execution_time_ms: i64,
    pub triggered_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl ExecutionRecord {
    /// Record a successful action dispatch.
    pub fn completed(job: &TriggerJob, action_result: Value, execution_time_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            rule_id: job.rule_id,
            trigger_type: job.trigger_type,
            trigger_payload: job.trigger_data.clone(),
            action_result: Some(action_result),
            success: true,
            skipped: false,
            error_message: None,
            execution_time_ms,
            triggered_by: job.triggered_by,
            created_at: Utc::now(),
        }
    }

    /// Record a skip (conditions unmatched, or rule missing/inactive when
    /// unmatched recording is enabled).
    pub fn skipped(job: &TriggerJob, execution_time_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            rule_id: job.rule_id,
            trigger_type: job.trigger_type,
            trigger_payload: job.trigger_data.clone(),
            action_result: None,
            success: true,
            skipped: true,
            error_message: None,
            execution_time_ms,
            triggered_by: job.triggered_by,
            created_at: Utc::now(),
        }
    }

    /// Record a failed action dispatch.
    pub fn failed(job: &TriggerJob, error: impl Into<String>, execution_time_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            rule_id: job.rule_id,
            trigger_type: job.trigger_type,
            trigger_payload: job.trigger_data.clone(),
            action_result: None,
            success: false,
            skipped: false,
            error_message: Some(error.into()),
            execution_time_ms,
            triggered_by: job.triggered_by,
            created_at: Utc::now(),
        }
    }
}

/// The result contract returned to the queue consumer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub success: bool,
    pub skipped: bool,
    pub execution_time_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionOutcome {
    pub fn completed(result: Value, execution_time_ms: i64) -> Self {
        Self {
            success: true,
            skipped: false,
            execution_time_ms,
            result: Some(result),
            error: None,
        }
    }

    pub fn skipped(execution_time_ms: i64) -> Self {
        Self {
            success: true,
            skipped: true,
            execution_time_ms,
            result: None,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>, execution_time_ms: i64) -> Self {
        Self {
            success: false,
            skipped: false,
            execution_time_ms,
            result: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job() -> TriggerJob {
        TriggerJob::new(
            Uuid::new_v4(),
            TriggerType::TaskCreated,
            json!({"task": {"id": Uuid::new_v4(), "priority": "high"}}),
        )
    }

    #[test]
    fn test_skipped_record_is_success_without_result() {
        let record = ExecutionRecord::skipped(&job(), 3);
        assert!(record.success);
        assert!(record.skipped);
        assert!(record.action_result.is_none());
        assert!(record.error_message.is_none());
    }

    #[test]
    fn test_failed_record_captures_error() {
        let record = ExecutionRecord::failed(&job(), "entity not found", 12);
        assert!(!record.success);
        assert!(!record.skipped);
        assert_eq!(record.error_message.as_deref(), Some("entity not found"));
        assert!(record.action_result.is_none());
    }

    #[test]
    fn test_trigger_job_wire_format() {
        let raw = json!({
            "ruleId": "7f2c5a90-91a9-4b4e-a531-3a0c3c5e8f21",
            "triggerType": "task_status_changed",
            "triggerData": {"task": {"id": "t1", "status": "done"}},
            "triggeredById": "e4cb5a51-0a02-4a2f-9c3b-54a3fb1c2d10"
        });
        let job: TriggerJob = serde_json::from_value(raw).unwrap();
        assert_eq!(job.trigger_type, TriggerType::TaskStatusChanged);
        assert!(job.triggered_by.is_some());

        let minimal: TriggerJob = serde_json::from_value(json!({
            "ruleId": "7f2c5a90-91a9-4b4e-a531-3a0c3c5e8f21",
            "triggerType": "task_created"
        }))
        .unwrap();
        assert!(minimal.triggered_by.is_none());
        assert!(minimal.trigger_data.is_null());
    }
}
