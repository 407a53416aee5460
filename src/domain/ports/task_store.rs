use crate::domain::errors::DomainResult;
use crate::domain::models::Task;
use async_trait::async_trait;
use uuid::Uuid;

/// Store port for task mutations performed by action handlers.
///
/// Updates are single-row and rely on the storage layer's own atomicity;
/// the engine holds no locks, and concurrent rules targeting the same task
/// race with last-writer-wins semantics.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Get a task by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Task>>;

    /// Insert a new task. Fails with `DomainError::DuplicateSlug` when the
    /// (project, slug) pair already exists; the uniqueness invariant lives
    /// in the storage layer, not here.
    async fn create(&self, task: &Task) -> DomainResult<()>;

    /// Update an existing task.
    async fn update(&self, task: &Task) -> DomainResult<()>;

    /// Next per-project sequence number: max existing + 1, starting at 1.
    async fn next_sequence(&self, project_id: Uuid) -> DomainResult<i64>;

    /// The project's slug prefix, or `None` for an unknown project.
    async fn project_slug(&self, project_id: Uuid) -> DomainResult<Option<String>>;
}
