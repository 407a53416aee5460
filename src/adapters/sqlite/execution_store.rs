//! SQLite implementation of the `ExecutionStore`.
//!
//! Insert and list only. There is deliberately no update path: execution
//! records are immutable once written.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_datetime, parse_optional_uuid, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ExecutionRecord, TriggerType};
use crate::domain::ports::ExecutionStore;

#[derive(Clone)]
pub struct SqliteExecutionStore {
    pool: SqlitePool,
}

impl SqliteExecutionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ExecutionRow {
    id: String,
    rule_id: String,
    trigger_type: String,
    trigger_payload: String,
    action_result: Option<String>,
    success: i64,
    skipped: i64,
    error_message: Option<String>,
    execution_time_ms: i64,
    triggered_by: Option<String>,
    created_at: String,
}

impl TryFrom<ExecutionRow> for ExecutionRecord {
    type Error = DomainError;

    fn try_from(row: ExecutionRow) -> Result<Self, Self::Error> {
        let trigger_type = TriggerType::from_str(&row.trigger_type).ok_or_else(|| {
            DomainError::SerializationError(format!("bad trigger type '{}'", row.trigger_type))
        })?;

        Ok(ExecutionRecord {
            id: parse_uuid(&row.id)?,
            rule_id: parse_uuid(&row.rule_id)?,
            trigger_type,
            trigger_payload: serde_json::from_str(&row.trigger_payload)?,
            action_result: row.action_result.as_deref().map(serde_json::from_str).transpose()?,
            success: row.success != 0,
            skipped: row.skipped != 0,
            error_message: row.error_message,
            execution_time_ms: row.execution_time_ms,
            triggered_by: parse_optional_uuid(row.triggered_by)?,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[async_trait]
impl ExecutionStore for SqliteExecutionStore {
    async fn create(&self, record: &ExecutionRecord) -> DomainResult<()> {
        let action_result = record
            .action_result
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"INSERT INTO rule_executions (id, rule_id, trigger_type, trigger_payload,
               action_result, success, skipped, error_message, execution_time_ms,
               triggered_by, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(record.id.to_string())
        .bind(record.rule_id.to_string())
        .bind(record.trigger_type.as_str())
        .bind(serde_json::to_string(&record.trigger_payload)?)
        .bind(action_result)
        .bind(i64::from(record.success))
        .bind(i64::from(record.skipped))
        .bind(&record.error_message)
        .bind(record.execution_time_ms)
        .bind(record.triggered_by.map(|id| id.to_string()))
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_rule(&self, rule_id: Uuid, limit: i64) -> DomainResult<Vec<ExecutionRecord>> {
        let rows: Vec<ExecutionRow> = sqlx::query_as(
            "SELECT * FROM rule_executions WHERE rule_id = ? ORDER BY created_at DESC LIMIT ?",
        )
        .bind(rule_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ExecutionRecord::try_from).collect()
    }
}
