//! Assign-task action handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::{emit_or_warn, parse_config, ActionError, ActionHandler, ActionResult, TriggerContext};
use crate::domain::errors::DomainError;
use crate::domain::models::ActionKind;
use crate::domain::ports::{EventNotifier, TaskStore};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignTaskConfig {
    assignee_ids: Vec<Uuid>,
    /// Replace the whole assignee set instead of adding to it.
    #[serde(default)]
    replace_existing: bool,
}

/// Adds assignees to (or replaces the assignee set of) the task the
/// trigger is about.
pub struct AssignTaskHandler {
    tasks: Arc<dyn TaskStore>,
    notifier: Arc<dyn EventNotifier>,
}

impl AssignTaskHandler {
    pub fn new(tasks: Arc<dyn TaskStore>, notifier: Arc<dyn EventNotifier>) -> Self {
        Self { tasks, notifier }
    }
}

#[async_trait]
impl ActionHandler for AssignTaskHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::AssignTask
    }

    async fn execute(
        &self,
        config: &Value,
        ctx: &TriggerContext,
    ) -> Result<ActionResult, ActionError> {
        let cfg: AssignTaskConfig = parse_config(config)?;
        if cfg.assignee_ids.is_empty() {
            return Err(ActionError::MissingField("assigneeIds"));
        }

        let task_id = ctx.task_id()?;
        let mut task = self
            .tasks
            .get(task_id)
            .await?
            .ok_or(DomainError::TaskNotFound(task_id))?;

        let previous = task.assignee_ids.clone();
        if cfg.replace_existing {
            task.assignee_ids = cfg.assignee_ids.clone();
        } else {
            for id in &cfg.assignee_ids {
                if !task.assignee_ids.contains(id) {
                    task.assignee_ids.push(*id);
                }
            }
        }
        task.touch();
        self.tasks.update(&task).await?;

        let added: Vec<Uuid> = task
            .assignee_ids
            .iter()
            .filter(|id| !previous.contains(id))
            .copied()
            .collect();
        for assignee_id in &added {
            emit_or_warn(
                &self.notifier,
                "task.assigned",
                json!({"taskId": task_id, "assigneeId": assignee_id}),
            )
            .await;
        }

        let mut data = Map::new();
        data.insert("taskId".to_string(), json!(task_id));
        data.insert("assigneeIds".to_string(), json!(task.assignee_ids));
        data.insert("replaced".to_string(), json!(cfg.replace_existing));
        Ok(ActionResult::ok(data))
    }
}
