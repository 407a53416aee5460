//! Task domain model.
//!
//! Only the slice of the platform's task entity that action handlers
//! mutate. Workflow statuses are user-defined per workspace, so `status`
//! stays an opaque string; priority is a closed enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Priority level for tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low = 1,
    Normal = 2,
    High = 3,
    Urgent = 4,
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Normal
    }
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "normal" | "medium" => Some(Self::Normal),
            "high" => Some(Self::High),
            "urgent" | "critical" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// A task row as the engine sees it.
///
/// `sequence` and `slug` are assigned at creation and never change; the
/// slug is unique within its project, enforced by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    /// Monotonic per-project counter; max existing + 1, starting at 1.
    pub sequence: i64,
    /// Human-readable reference, e.g. `CORE-42`.
    pub slug: String,
    pub title: String,
    pub description: String,
    /// Workspace-defined workflow state, e.g. `todo`, `in_review`.
    pub status: String,
    pub priority: TaskPriority,
    pub assignee_ids: Vec<Uuid>,
    pub labels: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
    /// `None` when the task was created by an automation rule.
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(project_id: Uuid, sequence: i64, slug: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            sequence,
            slug: slug.into(),
            title: title.into(),
            description: String::new(),
            status: "todo".to_string(),
            priority: TaskPriority::Normal,
            assignee_ids: Vec::new(),
            labels: Vec::new(),
            due_date: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_assignees(mut self, assignee_ids: Vec<Uuid>) -> Self {
        self.assignee_ids = assignee_ids;
        self
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_created_by(mut self, member_id: Uuid) -> Self {
        self.created_by = Some(member_id);
        self
    }

    /// Stamp a mutation. Handlers call this before `TaskStore::update`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
