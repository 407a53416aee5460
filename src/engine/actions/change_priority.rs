//! Change-priority action handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{emit_or_warn, parse_config, ActionError, ActionHandler, ActionResult, TriggerContext};
use crate::domain::errors::DomainError;
use crate::domain::models::{ActionKind, TaskPriority};
use crate::domain::ports::{EventNotifier, TaskStore};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePriorityConfig {
    priority: String,
}

/// Sets the triggering task's priority.
pub struct ChangePriorityHandler {
    tasks: Arc<dyn TaskStore>,
    notifier: Arc<dyn EventNotifier>,
}

impl ChangePriorityHandler {
    pub fn new(tasks: Arc<dyn TaskStore>, notifier: Arc<dyn EventNotifier>) -> Self {
        Self { tasks, notifier }
    }
}

#[async_trait]
impl ActionHandler for ChangePriorityHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::ChangePriority
    }

    async fn execute(
        &self,
        config: &Value,
        ctx: &TriggerContext,
    ) -> Result<ActionResult, ActionError> {
        let cfg: ChangePriorityConfig = parse_config(config)?;
        let priority = TaskPriority::from_str(&cfg.priority).ok_or_else(|| {
            ActionError::InvalidField {
                field: "priority",
                reason: format!("'{}' is not one of low, normal, high, urgent", cfg.priority),
            }
        })?;

        let task_id = ctx.task_id()?;
        let mut task = self
            .tasks
            .get(task_id)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))?;

        let previous = task.priority;
        task.priority = priority;
        task.touch();
        self.tasks.update(&task).await?;

        emit_or_warn(
            &self.notifier,
            "task.priority_changed",
            json!({
                "taskId": task_id,
                "previousPriority": previous.as_str(),
                "priority": priority.as_str()
            }),
        )
        .await;

        let mut data = Map::new();
        data.insert("taskId".to_string(), json!(task_id));
        data.insert("previousPriority".to_string(), json!(previous.as_str()));
        data.insert("priority".to_string(), json!(priority.as_str()));
        Ok(ActionResult::ok(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Task, TriggerType};
    use crate::engine::testing::{MemoryTaskStore, RecordingNotifier};
    use uuid::Uuid;

    fn ctx_for(task_id: Uuid) -> TriggerContext {
        TriggerContext {
            trigger_type: TriggerType::TaskUpdated,
            payload: json!({"task": {"id": task_id}}),
            triggered_by: None,
        }
    }

    #[tokio::test]
    async fn test_sets_priority() {
        let tasks = Arc::new(MemoryTaskStore::default());
        let task = Task::new(Uuid::new_v4(), 1, "CORE-1", "Fix login");
        let task_id = task.id;
        tasks.put_task(task).await;
        let handler = ChangePriorityHandler::new(tasks.clone(), Arc::new(RecordingNotifier::default()));

        let result = handler
            .execute(&json!({"priority": "urgent"}), &ctx_for(task_id))
            .await
            .unwrap();

        assert_eq!(result.data.get("previousPriority"), Some(&json!("normal")));
        assert_eq!(tasks.task(task_id).await.unwrap().priority, TaskPriority::Urgent);
    }

    #[tokio::test]
    async fn test_unknown_priority_is_configuration_error() {
        let handler = ChangePriorityHandler::new(
            Arc::new(MemoryTaskStore::default()),
            Arc::new(RecordingNotifier::default()),
        );

        let err = handler
            .execute(&json!({"priority": "sev1"}), &ctx_for(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidField { field: "priority", .. }));
        assert!(err.is_configuration());
    }
}
