//! Action dispatch: the registry and its handlers.
//!
//! Each handler is a thin adapter over the host's domain mutators. It
//! validates its config, performs exactly one mutation, emits realtime
//! events for affected entities, and returns a JSON-serializable snapshot
//! of what it touched. That snapshot is what lands in the audit trail.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::models::{ActionKind, TriggerType};
use crate::domain::ports::{
    CommentStore, EventNotifier, NotificationStore, NotifierEvent, TaskStore,
};

mod add_comment;
mod add_label;
mod assign_task;
mod change_priority;
mod change_status;
mod create_task;
mod send_notification;
mod set_due_date;

pub use add_comment::AddCommentHandler;
pub use add_label::AddLabelHandler;
pub use assign_task::AssignTaskHandler;
pub use change_priority::ChangePriorityHandler;
pub use change_status::ChangeStatusHandler;
pub use create_task::CreateTaskHandler;
pub use send_notification::SendNotificationHandler;
pub use set_due_date::SetDueDateHandler;

/// Structured result of one action dispatch.
#[derive(Debug, Clone)]
pub struct ActionResult {
    pub success: bool,
    /// Audit snapshot: ids touched, values set.
    pub data: Map<String, Value>,
    pub error: Option<String>,
}

impl ActionResult {
    pub fn ok(data: Map<String, Value>) -> Self {
        Self { success: true, data, error: None }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self { success: false, data: Map::new(), error: Some(error.into()) }
    }

    /// The snapshot stored on the execution record.
    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }
}

/// Errors an action handler can raise.
///
/// Configuration errors (bad or missing config, unusable payload) are not
/// retried by the consumer; mutation errors are.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Missing required config field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid config field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Invalid action config: {0}")]
    InvalidConfig(String),

    #[error("Trigger payload missing '{0}'")]
    MissingPayloadField(&'static str),

    #[error("No handler registered for action kind '{0}'")]
    UnknownKind(String),

    #[error(transparent)]
    Mutation(#[from] DomainError),
}

impl ActionError {
    /// Whether this is a rule-author problem rather than a transient one.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Mutation(_))
    }
}

/// Context handed to a handler alongside its config.
#[derive(Debug, Clone)]
pub struct TriggerContext {
    pub trigger_type: TriggerType,
    pub payload: Value,
    pub triggered_by: Option<Uuid>,
}

impl TriggerContext {
    /// The task the trigger event is about, read from `task.id`.
    pub fn task_id(&self) -> Result<Uuid, ActionError> {
        self.payload
            .pointer("/task/id")
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or(ActionError::MissingPayloadField("task.id"))
    }
}

/// A unit that performs one domain mutation for one action kind.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// The action kind this handler serves.
    fn kind(&self) -> ActionKind;

    /// Validate config, perform the mutation, return the audit snapshot.
    async fn execute(&self, config: &Value, ctx: &TriggerContext)
        -> Result<ActionResult, ActionError>;
}

/// Maps action kinds to handlers. One handler per kind; registering a
/// second handler for a kind replaces the first.
#[derive(Default)]
pub struct ActionRegistry {
    handlers: HashMap<ActionKind, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self { handlers: HashMap::new() }
    }

    /// Register all built-in handlers over the given mutator ports.
    pub fn with_default_handlers(
        tasks: Arc<dyn TaskStore>,
        notifications: Arc<dyn NotificationStore>,
        comments: Arc<dyn CommentStore>,
        notifier: Arc<dyn EventNotifier>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(AssignTaskHandler::new(tasks.clone(), notifier.clone())));
        registry.register(Arc::new(ChangeStatusHandler::new(tasks.clone(), notifier.clone())));
        registry.register(Arc::new(AddLabelHandler::new(tasks.clone(), notifier.clone())));
        registry.register(Arc::new(ChangePriorityHandler::new(tasks.clone(), notifier.clone())));
        registry.register(Arc::new(SetDueDateHandler::new(tasks.clone(), notifier.clone())));
        registry.register(Arc::new(AddCommentHandler::new(comments, notifier.clone())));
        registry.register(Arc::new(SendNotificationHandler::new(
            tasks.clone(),
            notifications,
            notifier.clone(),
        )));
        registry.register(Arc::new(CreateTaskHandler::new(tasks, notifier)));
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn ActionHandler>) {
        self.handlers.insert(handler.kind(), handler);
    }

    pub fn contains(&self, kind: ActionKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Dispatch to the handler registered for `kind`.
    pub async fn dispatch(
        &self,
        kind: ActionKind,
        config: &Value,
        ctx: &TriggerContext,
    ) -> Result<ActionResult, ActionError> {
        let handler = self
            .handlers
            .get(&kind)
            .ok_or_else(|| ActionError::UnknownKind(kind.as_str().to_string()))?;
        handler.execute(config, ctx).await
    }
}

/// Parse an action config into its typed struct. Unknown keys are ignored;
/// missing required keys surface as a structured configuration error.
pub(crate) fn parse_config<T: DeserializeOwned>(config: &Value) -> Result<T, ActionError> {
    serde_json::from_value(config.clone()).map_err(|e| ActionError::InvalidConfig(e.to_string()))
}

/// Emit a realtime event, logging (never propagating) delivery failures.
pub(crate) async fn emit_or_warn(notifier: &Arc<dyn EventNotifier>, kind: &str, payload: Value) {
    if let Err(err) = notifier.emit(NotifierEvent::new(kind, payload)).await {
        tracing::warn!(kind, error = %err, "Realtime event delivery failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{MemoryTaskStore, RecordingNotifier};
    use serde_json::json;

    #[test]
    fn test_configuration_errors_are_flagged() {
        assert!(ActionError::MissingField("label").is_configuration());
        assert!(ActionError::UnknownKind("nope".into()).is_configuration());
        assert!(!ActionError::Mutation(DomainError::TaskNotFound(Uuid::new_v4())).is_configuration());
    }

    #[test]
    fn test_context_task_id_extraction() {
        let ctx = TriggerContext {
            trigger_type: TriggerType::TaskUpdated,
            payload: json!({"task": {"id": "7f2c5a90-91a9-4b4e-a531-3a0c3c5e8f21"}}),
            triggered_by: None,
        };
        assert!(ctx.task_id().is_ok());

        let ctx = TriggerContext {
            trigger_type: TriggerType::TaskUpdated,
            payload: json!({"task": {"id": "not-a-uuid"}}),
            triggered_by: None,
        };
        assert!(matches!(ctx.task_id(), Err(ActionError::MissingPayloadField("task.id"))));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_kind_is_configuration_error() {
        let registry = ActionRegistry::new();
        let ctx = TriggerContext {
            trigger_type: TriggerType::TaskCreated,
            payload: json!({}),
            triggered_by: None,
        };
        let err = registry
            .dispatch(ActionKind::AddLabel, &json!({}), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::UnknownKind(_)));
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_default_registry_covers_every_kind() {
        let tasks = Arc::new(MemoryTaskStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let registry = ActionRegistry::with_default_handlers(
            tasks.clone(),
            Arc::new(crate::engine::testing::MemoryNotificationStore::default()),
            Arc::new(crate::engine::testing::MemoryCommentStore::default()),
            notifier,
        );

        for kind in [
            ActionKind::AssignTask,
            ActionKind::ChangeStatus,
            ActionKind::AddLabel,
            ActionKind::SendNotification,
            ActionKind::AddComment,
            ActionKind::ChangePriority,
            ActionKind::SetDueDate,
            ActionKind::CreateTask,
        ] {
            assert!(registry.contains(kind), "missing handler for {kind:?}");
        }
    }
}
