//! CLI command implementations.

pub mod executions;
pub mod rule;
pub mod run;
pub mod trigger;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::adapters::sqlite::{
    initialize_database, SqliteCommentStore, SqliteExecutionStore, SqliteNotificationStore,
    SqliteRuleStore, SqliteTaskStore,
};
use crate::domain::models::Config;
use crate::domain::ports::NullNotifier;
use crate::engine::{ActionRegistry, RuleOrchestrator};
use crate::infrastructure::config::ConfigLoader;

/// Load config and open the configured database, applying migrations.
pub(crate) async fn open_database() -> Result<(Config, SqlitePool)> {
    let config = ConfigLoader::load()?;
    let url = format!("sqlite:{}", config.database.path);
    let pool = initialize_database(&url, config.database.max_connections)
        .await
        .context("Failed to initialize database")?;
    Ok((config, pool))
}

/// Wire the orchestrator over the SQLite stores. The CLI has no realtime
/// delivery, so handlers emit into the null notifier.
pub(crate) fn build_orchestrator(config: &Config, pool: &SqlitePool) -> Arc<RuleOrchestrator> {
    let registry = ActionRegistry::with_default_handlers(
        Arc::new(SqliteTaskStore::new(pool.clone())),
        Arc::new(SqliteNotificationStore::new(pool.clone())),
        Arc::new(SqliteCommentStore::new(pool.clone())),
        Arc::new(NullNotifier),
    );
    Arc::new(
        RuleOrchestrator::new(
            Arc::new(SqliteRuleStore::new(pool.clone())),
            Arc::new(registry),
            Arc::new(SqliteExecutionStore::new(pool.clone())),
        )
        .with_record_unmatched(config.engine.record_unmatched),
    )
}
