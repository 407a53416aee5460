//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces the host application implements:
//! - `RuleStore` / `ExecutionStore`: persistence for the two engine entities
//! - `TaskStore` / `NotificationStore` / `CommentStore`: domain mutators the
//!   action handlers call into
//! - `EventNotifier`: fire-and-forget realtime delivery to connected clients
//!
//! The crate ships SQLite implementations under `adapters::sqlite`; the
//! traits keep the engine independent of any particular storage.

pub mod event_notifier;
pub mod execution_store;
pub mod notification_store;
pub mod rule_store;
pub mod task_store;

pub use event_notifier::{EventNotifier, NotifierError, NotifierEvent, NullNotifier};
pub use execution_store::ExecutionStore;
pub use notification_store::{CommentStore, NotificationStore};
pub use rule_store::{RuleFilter, RuleStore};
pub use task_store::TaskStore;
