//! In-memory test doubles for the engine's ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Comment, ExecutionRecord, Notification, Rule, RuleStatus, Task};
use crate::domain::ports::{
    CommentStore, EventNotifier, ExecutionStore, NotificationStore, NotifierError, NotifierEvent,
    RuleFilter, RuleStore, TaskStore,
};

#[derive(Default)]
pub(crate) struct MemoryRuleStore {
    rules: RwLock<HashMap<Uuid, Rule>>,
}

impl MemoryRuleStore {
    pub(crate) async fn put(&self, rule: Rule) {
        self.rules.write().await.insert(rule.id, rule);
    }
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Rule>> {
        Ok(self.rules.read().await.get(&id).cloned())
    }

    async fn insert(&self, rule: &Rule) -> DomainResult<()> {
        self.put(rule.clone()).await;
        Ok(())
    }

    async fn list(&self, filter: RuleFilter) -> DomainResult<Vec<Rule>> {
        let rules = self.rules.read().await;
        Ok(rules
            .values()
            .filter(|r| filter.workspace_id.is_none_or(|w| r.workspace_id == w))
            .filter(|r| filter.status.is_none_or(|s| r.status == s))
            .filter(|r| filter.trigger_type.is_none_or(|t| r.trigger_type == t))
            .cloned()
            .collect())
    }

    async fn set_status(&self, id: Uuid, status: RuleStatus) -> DomainResult<()> {
        let mut rules = self.rules.write().await;
        let rule = rules.get_mut(&id).ok_or(DomainError::RuleNotFound(id))?;
        rule.status = status;
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MemoryExecutionStore {
    records: RwLock<Vec<ExecutionRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryExecutionStore {
    pub(crate) fn failing() -> Self {
        let store = Self::default();
        store.fail_writes.store(true, Ordering::SeqCst);
        store
    }

    pub(crate) async fn records(&self) -> Vec<ExecutionRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl ExecutionStore for MemoryExecutionStore {
    async fn create(&self, record: &ExecutionRecord) -> DomainResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("write failed (simulated)".to_string()));
        }
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn list_for_rule(&self, rule_id: Uuid, limit: i64) -> DomainResult<Vec<ExecutionRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<ExecutionRecord> =
            records.iter().filter(|r| r.rule_id == rule_id).cloned().collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(matching)
    }
}

#[derive(Default)]
pub(crate) struct MemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
    projects: RwLock<HashMap<Uuid, String>>,
}

impl MemoryTaskStore {
    pub(crate) async fn put_project(&self, project_id: Uuid, slug: impl Into<String>) {
        self.projects.write().await.insert(project_id, slug.into());
    }

    pub(crate) async fn put_task(&self, task: Task) {
        self.tasks.write().await.insert(task.id, task);
    }

    pub(crate) async fn task(&self, id: Uuid) -> Option<Task> {
        self.tasks.read().await.get(&id).cloned()
    }

    pub(crate) async fn task_count(&self) -> usize {
        self.tasks.read().await.len()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn get(&self, id: Uuid) -> DomainResult<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn create(&self, task: &Task) -> DomainResult<()> {
        let mut tasks = self.tasks.write().await;
        let duplicate = tasks
            .values()
            .any(|t| t.project_id == task.project_id && t.slug == task.slug);
        if duplicate {
            return Err(DomainError::DuplicateSlug {
                project_id: task.project_id,
                slug: task.slug.clone(),
            });
        }
        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> DomainResult<()> {
        let mut tasks = self.tasks.write().await;
        if !tasks.contains_key(&task.id) {
            return Err(DomainError::TaskNotFound(task.id));
        }
        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn next_sequence(&self, project_id: Uuid) -> DomainResult<i64> {
        let tasks = self.tasks.read().await;
        let max = tasks
            .values()
            .filter(|t| t.project_id == project_id)
            .map(|t| t.sequence)
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn project_slug(&self, project_id: Uuid) -> DomainResult<Option<String>> {
        Ok(self.projects.read().await.get(&project_id).cloned())
    }
}

#[derive(Default)]
pub(crate) struct MemoryNotificationStore {
    notifications: RwLock<Vec<Notification>>,
}

impl MemoryNotificationStore {
    pub(crate) async fn all(&self) -> Vec<Notification> {
        self.notifications.read().await.clone()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create_many(&self, notifications: &[Notification]) -> DomainResult<()> {
        self.notifications.write().await.extend_from_slice(notifications);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MemoryCommentStore {
    comments: RwLock<Vec<Comment>>,
}

impl MemoryCommentStore {
    pub(crate) async fn all(&self) -> Vec<Comment> {
        self.comments.read().await.clone()
    }
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn create(&self, comment: &Comment) -> DomainResult<()> {
        self.comments.write().await.push(comment.clone());
        Ok(())
    }
}

/// Notifier that records every emitted event; optionally fails delivery.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    events: RwLock<Vec<NotifierEvent>>,
    fail_delivery: AtomicBool,
}

impl RecordingNotifier {
    pub(crate) fn failing() -> Self {
        let notifier = Self::default();
        notifier.fail_delivery.store(true, Ordering::SeqCst);
        notifier
    }

    pub(crate) async fn kinds(&self) -> Vec<String> {
        self.events.read().await.iter().map(|e| e.kind.clone()).collect()
    }
}

#[async_trait]
impl EventNotifier for RecordingNotifier {
    async fn emit(&self, event: NotifierEvent) -> Result<(), NotifierError> {
        if self.fail_delivery.load(Ordering::SeqCst) {
            return Err(NotifierError::Delivery("socket closed (simulated)".to_string()));
        }
        self.events.write().await.push(event);
        Ok(())
    }
}
