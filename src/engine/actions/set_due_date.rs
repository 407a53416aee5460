//! Set-due-date action handler.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{emit_or_warn, parse_config, ActionError, ActionHandler, ActionResult, TriggerContext};
use crate::domain::errors::DomainError;
use crate::domain::models::ActionKind;
use crate::domain::ports::{EventNotifier, TaskStore};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetDueDateConfig {
    /// RFC 3339 timestamp, or `null` to clear the due date.
    due_date: Option<String>,
}

/// Sets or clears the triggering task's due date.
pub struct SetDueDateHandler {
    tasks: Arc<dyn TaskStore>,
    notifier: Arc<dyn EventNotifier>,
}

impl SetDueDateHandler {
    pub fn new(tasks: Arc<dyn TaskStore>, notifier: Arc<dyn EventNotifier>) -> Self {
        Self { tasks, notifier }
    }
}

#[async_trait]
impl ActionHandler for SetDueDateHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::SetDueDate
    }

    async fn execute(
        &self,
        config: &Value,
        ctx: &TriggerContext,
    ) -> Result<ActionResult, ActionError> {
        let cfg: SetDueDateConfig = parse_config(config)?;
        let due_date = match cfg.due_date.as_deref() {
            None => None,
            Some(raw) => Some(
                DateTime::parse_from_rfc3339(raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| ActionError::InvalidField {
                        field: "dueDate",
                        reason: format!("'{raw}' is not RFC 3339: {e}"),
                    })?,
            ),
        };

        let task_id = ctx.task_id()?;
        let mut task = self
            .tasks
            .get(task_id)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))?;

        task.due_date = due_date;
        task.touch();
        self.tasks.update(&task).await?;

        emit_or_warn(
            &self.notifier,
            "task.updated",
            json!({"taskId": task_id, "dueDate": due_date.map(|d| d.to_rfc3339())}),
        )
        .await;

        let mut data = Map::new();
        data.insert("taskId".to_string(), json!(task_id));
        data.insert("dueDate".to_string(), json!(due_date.map(|d| d.to_rfc3339())));
        Ok(ActionResult::ok(data))
    }
}
