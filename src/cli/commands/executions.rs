//! Execution audit trail CLI command.

use anyhow::Result;
use clap::Args;
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::sqlite::SqliteExecutionStore;
use crate::cli::output::{list_table, output, truncate, CommandOutput};
use crate::domain::models::ExecutionRecord;
use crate::domain::ports::ExecutionStore;

#[derive(Args, Debug)]
pub struct ExecutionsArgs {
    /// Rule ID
    pub rule_id: Uuid,

    /// Maximum number of records to display
    #[arg(short, long, default_value = "20")]
    pub limit: i64,
}

#[derive(Debug, serde::Serialize)]
pub struct ExecutionOutput {
    pub id: String,
    pub outcome: String,
    pub execution_time_ms: i64,
    pub error: Option<String>,
    pub created_at: String,
}

impl From<&ExecutionRecord> for ExecutionOutput {
    fn from(record: &ExecutionRecord) -> Self {
        let outcome = if record.skipped {
            "skipped"
        } else if record.success {
            "success"
        } else {
            "failure"
        };
        Self {
            id: record.id.to_string(),
            outcome: outcome.to_string(),
            execution_time_ms: record.execution_time_ms,
            error: record.error_message.clone(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ExecutionListOutput {
    pub rule_id: String,
    pub executions: Vec<ExecutionOutput>,
    pub total: usize,
}

impl CommandOutput for ExecutionListOutput {
    fn to_human(&self) -> String {
        if self.executions.is_empty() {
            return format!("No executions recorded for rule {}.", self.rule_id);
        }

        let mut table = list_table(&["when", "outcome", "ms", "error"]);
        for execution in &self.executions {
            table.add_row(vec![
                execution.created_at.clone(),
                execution.outcome.clone(),
                execution.execution_time_ms.to_string(),
                execution.error.as_deref().map(|e| truncate(e, 48)).unwrap_or_default(),
            ]);
        }
        format!("Last {} execution(s) for rule {}:\n{table}", self.total, self.rule_id)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ExecutionsArgs, json_mode: bool) -> Result<()> {
    let (_config, pool) = super::open_database().await?;
    let store = Arc::new(SqliteExecutionStore::new(pool));

    let records = store.list_for_rule(args.rule_id, args.limit).await?;
    let out = ExecutionListOutput {
        rule_id: args.rule_id.to_string(),
        total: records.len(),
        executions: records.iter().map(ExecutionOutput::from).collect(),
    };
    output(&out, json_mode);

    Ok(())
}
