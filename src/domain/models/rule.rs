//! Automation rule domain model.
//!
//! A `Rule` pairs a trigger event kind with a condition spec and an action.
//! Rules are authored through the platform API; the engine only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a rule.
///
/// Only `Active` rules are ever evaluated. Disabling is the operator's
/// lever against a misbehaving rule; the engine never flips this itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    Active,
    Inactive,
}

impl Default for RuleStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" | "disabled" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// Domain event kinds a rule can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    TaskCreated,
    TaskUpdated,
    TaskStatusChanged,
    TaskPriorityChanged,
    TaskAssigneeChanged,
    TaskCompleted,
    TaskDeleted,
    CommentAdded,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskCreated => "task_created",
            Self::TaskUpdated => "task_updated",
            Self::TaskStatusChanged => "task_status_changed",
            Self::TaskPriorityChanged => "task_priority_changed",
            Self::TaskAssigneeChanged => "task_assignee_changed",
            Self::TaskCompleted => "task_completed",
            Self::TaskDeleted => "task_deleted",
            Self::CommentAdded => "comment_added",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "task_created" => Some(Self::TaskCreated),
            "task_updated" => Some(Self::TaskUpdated),
            "task_status_changed" => Some(Self::TaskStatusChanged),
            "task_priority_changed" => Some(Self::TaskPriorityChanged),
            "task_assignee_changed" => Some(Self::TaskAssigneeChanged),
            "task_completed" => Some(Self::TaskCompleted),
            "task_deleted" => Some(Self::TaskDeleted),
            "comment_added" => Some(Self::CommentAdded),
            _ => None,
        }
    }
}

/// Action kinds the engine can dispatch. One handler is registered per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    AssignTask,
    ChangeStatus,
    AddLabel,
    SendNotification,
    AddComment,
    ChangePriority,
    SetDueDate,
    CreateTask,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssignTask => "assign_task",
            Self::ChangeStatus => "change_status",
            Self::AddLabel => "add_label",
            Self::SendNotification => "send_notification",
            Self::AddComment => "add_comment",
            Self::ChangePriority => "change_priority",
            Self::SetDueDate => "set_due_date",
            Self::CreateTask => "create_task",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "assign_task" => Some(Self::AssignTask),
            "change_status" => Some(Self::ChangeStatus),
            "add_label" => Some(Self::AddLabel),
            "send_notification" => Some(Self::SendNotification),
            "add_comment" => Some(Self::AddComment),
            "change_priority" => Some(Self::ChangePriority),
            "set_due_date" => Some(Self::SetDueDate),
            "create_task" => Some(Self::CreateTask),
            _ => None,
        }
    }
}

/// A declarative automation rule.
///
/// `conditions` holds the spec exactly as authored (tagged tree or the
/// legacy flat map); it is parsed at evaluation time so that a malformed
/// spec degrades to "never matches" instead of poisoning the rule row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub description: String,
    pub status: RuleStatus,
    pub trigger_type: TriggerType,
    /// Raw condition spec; `null` or `{}` means "always match".
    pub conditions: serde_json::Value,
    pub action_kind: ActionKind,
    /// Opaque per-kind config, validated by the chosen handler.
    pub action_config: serde_json::Value,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rule {
    pub fn new(
        workspace_id: Uuid,
        name: impl Into<String>,
        trigger_type: TriggerType,
        action_kind: ActionKind,
        action_config: serde_json::Value,
        created_by: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            name: name.into(),
            description: String::new(),
            status: RuleStatus::Active,
            trigger_type,
            conditions: serde_json::Value::Null,
            action_kind,
            action_config,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_conditions(mut self, conditions: serde_json::Value) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_status(mut self, status: RuleStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the engine may evaluate this rule at all.
    pub fn is_active(&self) -> bool {
        self.status == RuleStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(RuleStatus::from_str("active"), Some(RuleStatus::Active));
        assert_eq!(RuleStatus::from_str("disabled"), Some(RuleStatus::Inactive));
        assert_eq!(RuleStatus::Active.as_str(), "active");
        assert_eq!(RuleStatus::from_str("bogus"), None);
    }

    #[test]
    fn test_trigger_type_round_trip() {
        for t in [
            TriggerType::TaskCreated,
            TriggerType::TaskStatusChanged,
            TriggerType::CommentAdded,
        ] {
            assert_eq!(TriggerType::from_str(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_action_kind_round_trip() {
        for k in [
            ActionKind::AssignTask,
            ActionKind::CreateTask,
            ActionKind::SetDueDate,
        ] {
            assert_eq!(ActionKind::from_str(k.as_str()), Some(k));
        }
    }

    #[test]
    fn test_rule_builder() {
        let rule = Rule::new(
            Uuid::new_v4(),
            "escalate-bugs",
            TriggerType::TaskCreated,
            ActionKind::AddLabel,
            serde_json::json!({"label": "triage"}),
            Uuid::new_v4(),
        )
        .with_description("Label new bug reports for triage");

        assert!(rule.is_active());
        assert!(rule.conditions.is_null());
        assert_eq!(rule.action_kind, ActionKind::AddLabel);
    }
}
