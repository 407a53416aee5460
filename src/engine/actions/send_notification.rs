//! Send-notification action handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::{emit_or_warn, parse_config, ActionError, ActionHandler, ActionResult, TriggerContext};
use crate::domain::errors::DomainError;
use crate::domain::models::{ActionKind, Notification};
use crate::domain::ports::{EventNotifier, NotificationStore, TaskStore};

/// Who receives the notification: the triggering task's current assignees,
/// or an explicit member list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Recipients {
    Keyword(String),
    Ids(Vec<Uuid>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendNotificationConfig {
    message: String,
    #[serde(default)]
    title: Option<String>,
    recipients: Recipients,
}

/// Writes one batch of in-app notifications, then emits one realtime event
/// per recipient. The store write is the single mutation; fan-out happens
/// only at the notifier.
pub struct SendNotificationHandler {
    tasks: Arc<dyn TaskStore>,
    notifications: Arc<dyn NotificationStore>,
    notifier: Arc<dyn EventNotifier>,
}

impl SendNotificationHandler {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        notifications: Arc<dyn NotificationStore>,
        notifier: Arc<dyn EventNotifier>,
    ) -> Self {
        Self { tasks, notifications, notifier }
    }

    async fn resolve_recipients(
        &self,
        recipients: &Recipients,
        ctx: &TriggerContext,
    ) -> Result<Vec<Uuid>, ActionError> {
        match recipients {
            Recipients::Ids(ids) => Ok(ids.clone()),
            Recipients::Keyword(word) if word == "assignees" => {
                let task_id = ctx.task_id()?;
                let task = self
                    .tasks
                    .get(task_id)
                    .await?
                    .ok_or(DomainError::TaskNotFound(task_id))?;
                Ok(task.assignee_ids)
            }
            Recipients::Keyword(other) => Err(ActionError::InvalidField {
                field: "recipients",
                reason: format!("'{other}' is not 'assignees' or a list of member ids"),
            }),
        }
    }
}

#[async_trait]
impl ActionHandler for SendNotificationHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::SendNotification
    }

    async fn execute(
        &self,
        config: &Value,
        ctx: &TriggerContext,
    ) -> Result<ActionResult, ActionError> {
        let cfg: SendNotificationConfig = parse_config(config)?;
        if cfg.message.trim().is_empty() {
            return Err(ActionError::MissingField("message"));
        }

        let recipient_ids = self.resolve_recipients(&cfg.recipients, ctx).await?;
        let task_id = ctx.task_id().ok();
        let title = cfg.title.unwrap_or_else(|| "Automation rule".to_string());

        let batch: Vec<Notification> = recipient_ids
            .iter()
            .map(|recipient| {
                let mut n = Notification::new(*recipient, "rule.notification", title.clone())
                    .with_body(cfg.message.clone());
                if let Some(task_id) = task_id {
                    n = n.with_task(task_id);
                }
                n
            })
            .collect();

        // One batch write even for N recipients.
        self.notifications.create_many(&batch).await?;

        for notification in &batch {
            emit_or_warn(
                &self.notifier,
                "notification.created",
                json!({
                    "notificationId": notification.id,
                    "recipientId": notification.recipient_id
                }),
            )
            .await;
        }

        let mut data = Map::new();
        data.insert("recipientIds".to_string(), json!(recipient_ids));
        data.insert("count".to_string(), json!(batch.len()));
        if let Some(task_id) = task_id {
            data.insert("taskId".to_string(), json!(task_id));
        }
        Ok(ActionResult::ok(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Task, TriggerType};
    use crate::engine::testing::{MemoryNotificationStore, MemoryTaskStore, RecordingNotifier};

    fn ctx_for(task_id: Uuid) -> TriggerContext {
        TriggerContext {
            trigger_type: TriggerType::TaskStatusChanged,
            payload: json!({"task": {"id": task_id}}),
            triggered_by: None,
        }
    }

    #[tokio::test]
    async fn test_explicit_recipient_list() {
        let store = Arc::new(MemoryNotificationStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let handler = SendNotificationHandler::new(
            Arc::new(MemoryTaskStore::default()),
            store.clone(),
            notifier.clone(),
        );
        let recipients = vec![Uuid::new_v4(), Uuid::new_v4()];

        let result = handler
            .execute(
                &json!({"message": "Sprint closing", "recipients": recipients}),
                &ctx_for(Uuid::new_v4()),
            )
            .await
            .unwrap();

        assert_eq!(result.data.get("count"), Some(&json!(2)));
        assert_eq!(store.all().await.len(), 2);
        // One realtime event per recipient.
        assert_eq!(notifier.kinds().await.len(), 2);
    }

    #[tokio::test]
    async fn test_assignees_keyword_resolves_from_task() {
        let tasks = Arc::new(MemoryTaskStore::default());
        let assignee = Uuid::new_v4();
        let task = Task::new(Uuid::new_v4(), 1, "CORE-1", "Fix login").with_assignees(vec![assignee]);
        let task_id = task.id;
        tasks.put_task(task).await;
        let store = Arc::new(MemoryNotificationStore::default());
        let handler =
            SendNotificationHandler::new(tasks, store.clone(), Arc::new(RecordingNotifier::default()));

        handler
            .execute(
                &json!({"message": "Heads up", "recipients": "assignees"}),
                &ctx_for(task_id),
            )
            .await
            .unwrap();

        let stored = store.all().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].recipient_id, assignee);
        assert_eq!(stored[0].task_id, Some(task_id));
    }

    #[tokio::test]
    async fn test_unknown_recipients_keyword_is_configuration_error() {
        let handler = SendNotificationHandler::new(
            Arc::new(MemoryTaskStore::default()),
            Arc::new(MemoryNotificationStore::default()),
            Arc::new(RecordingNotifier::default()),
        );

        let err = handler
            .execute(
                &json!({"message": "Hi", "recipients": "everyone"}),
                &ctx_for(Uuid::new_v4()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::InvalidField { field: "recipients", .. }));
    }
}
