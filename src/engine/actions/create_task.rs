//! Create-task action handler.
//!
//! The one handler with a side invariant: the new task's slug must be
//! unique within its project. Uniqueness is enforced by the storage
//! layer's unique index, not here; a lost race surfaces as
//! `DomainError::DuplicateSlug` and the delivery retries with a fresh
//! sequence number.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::{emit_or_warn, parse_config, ActionError, ActionHandler, ActionResult, TriggerContext};
use crate::domain::errors::DomainError;
use crate::domain::models::{ActionKind, Task, TaskPriority};
use crate::domain::ports::{EventNotifier, TaskStore};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTaskConfig {
    project_id: Uuid,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    assignee_ids: Vec<Uuid>,
    #[serde(default)]
    labels: Vec<String>,
}

/// Creates a follow-up task in the configured project.
pub struct CreateTaskHandler {
    tasks: Arc<dyn TaskStore>,
    notifier: Arc<dyn EventNotifier>,
}

impl CreateTaskHandler {
    pub fn new(tasks: Arc<dyn TaskStore>, notifier: Arc<dyn EventNotifier>) -> Self {
        Self { tasks, notifier }
    }
}

#[async_trait]
impl ActionHandler for CreateTaskHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::CreateTask
    }

    async fn execute(
        &self,
        config: &Value,
        ctx: &TriggerContext,
    ) -> Result<ActionResult, ActionError> {
        let cfg: CreateTaskConfig = parse_config(config)?;
        if cfg.title.trim().is_empty() {
            return Err(ActionError::MissingField("title"));
        }
        let priority = match cfg.priority.as_deref() {
            None => TaskPriority::default(),
            Some(raw) => TaskPriority::from_str(raw).ok_or_else(|| ActionError::InvalidField {
                field: "priority",
                reason: format!("'{raw}' is not one of low, normal, high, urgent"),
            })?,
        };

        let project_slug = self
            .tasks
            .project_slug(cfg.project_id)
            .await?
            .ok_or(DomainError::ProjectNotFound(cfg.project_id))?;
        let sequence = self.tasks.next_sequence(cfg.project_id).await?;
        let slug = format!("{}-{}", project_slug.to_uppercase(), sequence);

        let mut task = Task::new(cfg.project_id, sequence, slug.clone(), cfg.title)
            .with_priority(priority)
            .with_assignees(cfg.assignee_ids)
            .with_labels(cfg.labels);
        if let Some(description) = cfg.description {
            task = task.with_description(description);
        }
        if let Some(status) = cfg.status {
            task = task.with_status(status);
        }
        if let Some(member) = ctx.triggered_by {
            task = task.with_created_by(member);
        }

        self.tasks.create(&task).await?;

        emit_or_warn(
            &self.notifier,
            "task.created",
            json!({"taskId": task.id, "projectId": cfg.project_id, "slug": slug}),
        )
        .await;

        let mut data = Map::new();
        data.insert("taskId".to_string(), json!(task.id));
        data.insert("projectId".to_string(), json!(cfg.project_id));
        data.insert("sequence".to_string(), json!(sequence));
        data.insert("slug".to_string(), json!(slug));
        Ok(ActionResult::ok(data))
    }
}
