//! SQLite implementation of the `RuleStore`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ActionKind, Rule, RuleStatus, TriggerType};
use crate::domain::ports::{RuleFilter, RuleStore};

#[derive(Clone)]
pub struct SqliteRuleStore {
    pool: SqlitePool,
}

impl SqliteRuleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RuleRow {
    id: String,
    workspace_id: String,
    name: String,
    description: String,
    status: String,
    trigger_type: String,
    conditions: String,
    action_kind: String,
    action_config: String,
    created_by: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<RuleRow> for Rule {
    type Error = DomainError;

    fn try_from(row: RuleRow) -> Result<Self, Self::Error> {
        let status = RuleStatus::from_str(&row.status)
            .ok_or_else(|| DomainError::SerializationError(format!("bad rule status '{}'", row.status)))?;
        let trigger_type = TriggerType::from_str(&row.trigger_type).ok_or_else(|| {
            DomainError::SerializationError(format!("bad trigger type '{}'", row.trigger_type))
        })?;
        let action_kind = ActionKind::from_str(&row.action_kind).ok_or_else(|| {
            DomainError::SerializationError(format!("bad action kind '{}'", row.action_kind))
        })?;

        Ok(Rule {
            id: parse_uuid(&row.id)?,
            workspace_id: parse_uuid(&row.workspace_id)?,
            name: row.name,
            description: row.description,
            status,
            trigger_type,
            conditions: serde_json::from_str(&row.conditions)?,
            action_kind,
            action_config: serde_json::from_str(&row.action_config)?,
            created_by: parse_uuid(&row.created_by)?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[async_trait]
impl RuleStore for SqliteRuleStore {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Rule>> {
        let row: Option<RuleRow> = sqlx::query_as("SELECT * FROM rules WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Rule::try_from).transpose()
    }

    async fn insert(&self, rule: &Rule) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO rules (id, workspace_id, name, description, status, trigger_type,
               conditions, action_kind, action_config, created_by, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(rule.id.to_string())
        .bind(rule.workspace_id.to_string())
        .bind(&rule.name)
        .bind(&rule.description)
        .bind(rule.status.as_str())
        .bind(rule.trigger_type.as_str())
        .bind(serde_json::to_string(&rule.conditions)?)
        .bind(rule.action_kind.as_str())
        .bind(serde_json::to_string(&rule.action_config)?)
        .bind(rule.created_by.to_string())
        .bind(rule.created_at.to_rfc3339())
        .bind(rule.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, filter: RuleFilter) -> DomainResult<Vec<Rule>> {
        let mut query = String::from("SELECT * FROM rules WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();

        if let Some(workspace_id) = &filter.workspace_id {
            query.push_str(" AND workspace_id = ?");
            bindings.push(workspace_id.to_string());
        }
        if let Some(status) = &filter.status {
            query.push_str(" AND status = ?");
            bindings.push(status.as_str().to_string());
        }
        if let Some(trigger_type) = &filter.trigger_type {
            query.push_str(" AND trigger_type = ?");
            bindings.push(trigger_type.as_str().to_string());
        }

        query.push_str(" ORDER BY created_at DESC");

        let mut q = sqlx::query_as::<_, RuleRow>(&query);
        for binding in &bindings {
            q = q.bind(binding);
        }

        let rows: Vec<RuleRow> = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(Rule::try_from).collect()
    }

    async fn set_status(&self, id: Uuid, status: RuleStatus) -> DomainResult<()> {
        let result = sqlx::query("UPDATE rules SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::RuleNotFound(id));
        }

        Ok(())
    }
}
