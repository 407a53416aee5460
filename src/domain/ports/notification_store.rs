use crate::domain::errors::DomainResult;
use crate::domain::models::{Comment, Notification};
use async_trait::async_trait;

/// Store port for in-app notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Insert a batch of notifications as one mutation. Handlers that fan
    /// out to N recipients call this once, not N times.
    async fn create_many(&self, notifications: &[Notification]) -> DomainResult<()>;
}

/// Store port for task comments.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn create(&self, comment: &Comment) -> DomainResult<()>;
}
