//! Notification and comment domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An in-app notification row. Delivery to connected clients happens
/// separately through the `EventNotifier` port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    /// Short machine kind, e.g. `rule.notification`, `task.assigned`.
    pub kind: String,
    pub title: String,
    pub body: String,
    pub task_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(recipient_id: Uuid, kind: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            kind: kind.into(),
            title: title.into(),
            body: String::new(),
            task_id: None,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_task(mut self, task_id: Uuid) -> Self {
        self.task_id = Some(task_id);
        self
    }
}

/// A task comment. `author_id` is `None` when authored by an automation
/// rule rather than a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub author_id: Option<Uuid>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(task_id: Uuid, author_id: Option<Uuid>, body: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            author_id,
            body: body.into(),
            created_at: Utc::now(),
        }
    }
}
