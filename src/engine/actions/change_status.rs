//! Change-status action handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{emit_or_warn, parse_config, ActionError, ActionHandler, ActionResult, TriggerContext};
use crate::domain::errors::DomainError;
use crate::domain::models::ActionKind;
use crate::domain::ports::{EventNotifier, TaskStore};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeStatusConfig {
    /// Target workflow state. States are workspace-defined, so this is an
    /// opaque string validated at rule-save time.
    status: String,
}

/// Moves the triggering task to a different workflow state.
pub struct ChangeStatusHandler {
    tasks: Arc<dyn TaskStore>,
    notifier: Arc<dyn EventNotifier>,
}

impl ChangeStatusHandler {
    pub fn new(tasks: Arc<dyn TaskStore>, notifier: Arc<dyn EventNotifier>) -> Self {
        Self { tasks, notifier }
    }
}

#[async_trait]
impl ActionHandler for ChangeStatusHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::ChangeStatus
    }

    async fn execute(
        &self,
        config: &Value,
        ctx: &TriggerContext,
    ) -> Result<ActionResult, ActionError> {
        let cfg: ChangeStatusConfig = parse_config(config)?;
        if cfg.status.trim().is_empty() {
            return Err(ActionError::MissingField("status"));
        }

        let task_id = ctx.task_id()?;
        let mut task = self
            .tasks
            .get(task_id)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))?;

        let previous_status = std::mem::replace(&mut task.status, cfg.status.clone());
        task.touch();
        self.tasks.update(&task).await?;

        emit_or_warn(
            &self.notifier,
            "task.status_changed",
            json!({"taskId": task_id, "previousStatus": previous_status, "status": cfg.status}),
        )
        .await;

        let mut data = Map::new();
        data.insert("taskId".to_string(), json!(task_id));
        data.insert("previousStatus".to_string(), json!(previous_status));
        data.insert("status".to_string(), json!(cfg.status));
        Ok(ActionResult::ok(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Task, TriggerType};
    use crate::engine::testing::{MemoryTaskStore, RecordingNotifier};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_changes_status_and_reports_previous() {
        let tasks = Arc::new(MemoryTaskStore::default());
        let task = Task::new(Uuid::new_v4(), 1, "CORE-1", "Fix login").with_status("in_progress");
        let task_id = task.id;
        tasks.put_task(task).await;
        let notifier = Arc::new(RecordingNotifier::default());
        let handler = ChangeStatusHandler::new(tasks.clone(), notifier.clone());

        let ctx = TriggerContext {
            trigger_type: TriggerType::TaskUpdated,
            payload: json!({"task": {"id": task_id}}),
            triggered_by: None,
        };
        let result = handler.execute(&json!({"status": "done"}), &ctx).await.unwrap();

        assert_eq!(result.data.get("previousStatus"), Some(&json!("in_progress")));
        assert_eq!(tasks.task(task_id).await.unwrap().status, "done");
        assert_eq!(notifier.kinds().await, vec!["task.status_changed"]);
    }

    #[tokio::test]
    async fn test_blank_status_is_configuration_error() {
        let handler = ChangeStatusHandler::new(
            Arc::new(MemoryTaskStore::default()),
            Arc::new(RecordingNotifier::default()),
        );
        let ctx = TriggerContext {
            trigger_type: TriggerType::TaskUpdated,
            payload: json!({"task": {"id": Uuid::new_v4()}}),
            triggered_by: None,
        };

        let err = handler.execute(&json!({"status": "  "}), &ctx).await.unwrap_err();
        assert!(matches!(err, ActionError::MissingField("status")));
    }
}
