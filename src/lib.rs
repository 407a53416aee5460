//! Flywheel - automation rule engine
//!
//! Flywheel is the automation subsystem of a project-management platform:
//! rules react to domain events (task created, status changed, ...) and
//! execute actions (assign, relabel, notify, create a follow-up task),
//! leaving an append-only execution audit trail.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): entities, the condition spec, and port traits
//! - **Engine Layer** (`engine`): condition evaluation, action dispatch,
//!   orchestration, and the audit recorder
//! - **Adapters** (`adapters`): SQLite implementations of the store ports
//! - **Infrastructure** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): operator tooling
//!
//! # Example
//!
//! ```ignore
//! use flywheel::engine::RuleOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Wire stores, build the registry, execute trigger jobs.
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::models::{
    ActionKind, Comment, ConditionError, ConditionSpec, Config, DatabaseConfig, EngineConfig,
    ExecutionOutcome, ExecutionRecord, LoggingConfig, Notification, Rule, RuleStatus, Task,
    TaskPriority, TriggerJob, TriggerType, WorkerConfig,
};
pub use domain::ports::{
    CommentStore, EventNotifier, ExecutionStore, NotificationStore, NullNotifier, RuleFilter,
    RuleStore, TaskStore,
};
pub use engine::{
    ActionError, ActionHandler, ActionRegistry, ActionResult, EngineError, ExecutionRecorder,
    RecorderError, RuleOrchestrator, TriggerConsumer, TriggerContext,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
