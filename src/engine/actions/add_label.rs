//! Add-label action handler.

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
struct AddLabelConfig {
    label: String,
}

/// Adds a label to the triggering task. Idempotent: re-adding an existing
/// label is a successful no-op, reported via `added: false`.
pub struct AddLabelHandler {
    tasks: Arc<dyn TaskStore>,
    notifier: Arc<dyn EventNotifier>,
}

impl AddLabelHandler {
    pub fn new(tasks: Arc<dyn TaskStore>, notifier: Arc<dyn EventNotifier>) -> Self {
        Self { tasks, notifier }
    }
}

#[async_trait]
impl ActionHandler for AddLabelHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::AddLabel
    }

    async fn execute(
        &self,
        config: &Value,
        ctx: &TriggerContext,
    ) -> Result<ActionResult, ActionError> {
        let cfg: AddLabelConfig = parse_config(config)?;
        if cfg.label.trim().is_empty() {
            return Err(ActionError::MissingField("label"));
        }

        let task_id = ctx.task_id()?;
        let mut task = self
            .tasks
            .get(task_id)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))?;

        let added = !task.labels.contains(&cfg.label);
        if added {
            task.labels.push(cfg.label.clone());
            task.touch();
            self.tasks.update(&task).await?;
            emit_or_warn(
                &self.notifier,
                "task.updated",
                json!({"taskId": task_id, "label": cfg.label}),
            )
            .await;
        }

        let mut data = Map::new();
        data.insert("taskId".to_string(), json!(task_id));
        data.insert("label".to_string(), json!(cfg.label));
        data.insert("added".to_string(), json!(added));
        Ok(ActionResult::ok(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Task, TriggerType};
    use crate::engine::testing::{MemoryTaskStore, RecordingNotifier};
    use uuid::Uuid;

    async fn setup(labels: Vec<String>) -> (Arc<MemoryTaskStore>, Uuid) {
        let tasks = Arc::new(MemoryTaskStore::default());
        let task = Task::new(Uuid::new_v4(), 1, "CORE-1", "Fix login").with_labels(labels);
        let task_id = task.id;
        tasks.put_task(task).await;
        (tasks, task_id)
    }

    fn ctx_for(task_id: Uuid) -> TriggerContext {
        TriggerContext {
            trigger_type: TriggerType::TaskCreated,
            payload: json!({"task": {"id": task_id}}),
            triggered_by: None,
        }
    }

    #[tokio::test]
    async fn test_adds_new_label() {
        let (tasks, task_id) = setup(vec![]).await;
        let handler = AddLabelHandler::new(tasks.clone(), Arc::new(RecordingNotifier::default()));

        let result = handler
            .execute(&json!({"label": "triage"}), &ctx_for(task_id))
            .await
            .unwrap();

        assert_eq!(result.data.get("added"), Some(&json!(true)));
        assert_eq!(tasks.task(task_id).await.unwrap().labels, vec!["triage"]);
    }

    #[tokio::test]
    async fn test_existing_label_is_noop() {
        let (tasks, task_id) = setup(vec!["triage".to_string()]).await;
        let notifier = Arc::new(RecordingNotifier::default());
        let handler = AddLabelHandler::new(tasks.clone(), notifier.clone());

        let result = handler
            .execute(&json!({"label": "triage"}), &ctx_for(task_id))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.data.get("added"), Some(&json!(false)));
        assert_eq!(tasks.task(task_id).await.unwrap().labels.len(), 1);
        assert!(notifier.kinds().await.is_empty());
    }
}
