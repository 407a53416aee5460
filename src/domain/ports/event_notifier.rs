use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// An event pushed to connected clients after a successful mutation.
#[derive(Debug, Clone, Serialize)]
pub struct NotifierEvent {
    /// Machine kind, e.g. `task.assigned`, `comment.added`.
    pub kind: String,
    pub payload: Value,
}

impl NotifierEvent {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self { kind: kind.into(), payload }
    }
}

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Notifier delivery failed: {0}")]
    Delivery(String),
}

/// Fire-and-forget realtime delivery. Emit failures must never fail the
/// action that triggered them; handlers log and move on.
#[async_trait]
pub trait EventNotifier: Send + Sync {
    async fn emit(&self, event: NotifierEvent) -> Result<(), NotifierError>;
}

/// No-op notifier for hosts without realtime delivery and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

#[async_trait]
impl EventNotifier for NullNotifier {
    async fn emit(&self, _event: NotifierEvent) -> Result<(), NotifierError> {
        Ok(())
    }
}
