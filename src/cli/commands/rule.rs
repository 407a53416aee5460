//! Rule management CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::sqlite::SqliteRuleStore;
use crate::cli::output::{list_table, output, truncate, CommandOutput};
use crate::domain::models::{ActionKind, Rule, RuleStatus, TriggerType};
use crate::domain::ports::{RuleFilter, RuleStore};

#[derive(Args, Debug)]
pub struct RuleArgs {
    #[command(subcommand)]
    pub command: RuleCommands,
}

#[derive(Subcommand, Debug)]
pub enum RuleCommands {
    /// List rules
    List {
        /// Filter by workspace ID
        #[arg(long)]
        workspace: Option<Uuid>,

        /// Only show active rules
        #[arg(long)]
        active_only: bool,
    },
    /// Show rule details
    Show {
        /// Rule ID
        id: Uuid,
    },
    /// Enable a rule
    Enable {
        /// Rule ID
        id: Uuid,
    },
    /// Disable a rule
    Disable {
        /// Rule ID
        id: Uuid,
    },
    /// Import rule definitions from a YAML file
    Import {
        /// Path to the YAML file
        file: PathBuf,
    },
}

/// One rule definition in an import file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleImport {
    workspace_id: Uuid,
    name: String,
    #[serde(default)]
    description: String,
    trigger_type: TriggerType,
    #[serde(default)]
    conditions: serde_json::Value,
    action_kind: ActionKind,
    #[serde(default)]
    action_config: serde_json::Value,
    created_by: Uuid,
    #[serde(default)]
    disabled: bool,
}

impl From<RuleImport> for Rule {
    fn from(import: RuleImport) -> Self {
        let status = if import.disabled { RuleStatus::Inactive } else { RuleStatus::Active };
        Rule::new(
            import.workspace_id,
            import.name,
            import.trigger_type,
            import.action_kind,
            import.action_config,
            import.created_by,
        )
        .with_description(import.description)
        .with_conditions(import.conditions)
        .with_status(status)
    }
}

#[derive(Debug, serde::Serialize)]
pub struct RuleOutput {
    pub id: String,
    pub name: String,
    pub status: String,
    pub trigger_type: String,
    pub action_kind: String,
    pub description: String,
}

impl From<&Rule> for RuleOutput {
    fn from(rule: &Rule) -> Self {
        Self {
            id: rule.id.to_string(),
            name: rule.name.clone(),
            status: rule.status.as_str().to_string(),
            trigger_type: rule.trigger_type.as_str().to_string(),
            action_kind: rule.action_kind.as_str().to_string(),
            description: truncate(&rule.description, 40),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct RuleListOutput {
    pub rules: Vec<RuleOutput>,
    pub total: usize,
}

impl CommandOutput for RuleListOutput {
    fn to_human(&self) -> String {
        if self.rules.is_empty() {
            return "No rules found.".to_string();
        }

        let mut table = list_table(&["id", "name", "status", "trigger", "action"]);
        for rule in &self.rules {
            table.add_row(vec![
                &rule.id[..8],
                rule.name.as_str(),
                rule.status.as_str(),
                rule.trigger_type.as_str(),
                rule.action_kind.as_str(),
            ]);
        }
        format!("Found {} rule(s):\n{table}", self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct RuleDetailOutput {
    pub rule: RuleOutput,
    pub conditions: String,
    pub action_config: String,
}

impl CommandOutput for RuleDetailOutput {
    fn to_human(&self) -> String {
        [
            format!("Rule: {}", self.rule.name),
            format!("ID: {}", self.rule.id),
            format!("Status: {}", self.rule.status),
            format!("Trigger: {}", self.rule.trigger_type),
            format!("Action: {}", self.rule.action_kind),
            format!("Description: {}", self.rule.description),
            format!("\nConditions: {}", self.conditions),
            format!("Action config: {}", self.action_config),
        ]
        .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct RuleActionOutput {
    pub success: bool,
    pub message: String,
}

impl CommandOutput for RuleActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RuleArgs, json_mode: bool) -> Result<()> {
    let (_config, pool) = super::open_database().await?;
    let store = Arc::new(SqliteRuleStore::new(pool));

    match args.command {
        RuleCommands::List { workspace, active_only } => {
            let filter = RuleFilter {
                workspace_id: workspace,
                status: active_only.then_some(RuleStatus::Active),
                trigger_type: None,
            };
            let rules = store.list(filter).await?;

            let out = RuleListOutput {
                total: rules.len(),
                rules: rules.iter().map(RuleOutput::from).collect(),
            };
            output(&out, json_mode);
        }

        RuleCommands::Show { id } => {
            let rule = store
                .find_by_id(id)
                .await?
                .with_context(|| format!("Rule not found: {id}"))?;

            let out = RuleDetailOutput {
                rule: RuleOutput::from(&rule),
                conditions: serde_json::to_string_pretty(&rule.conditions).unwrap_or_default(),
                action_config: serde_json::to_string_pretty(&rule.action_config).unwrap_or_default(),
            };
            output(&out, json_mode);
        }

        RuleCommands::Enable { id } => {
            store.set_status(id, RuleStatus::Active).await?;
            let out = RuleActionOutput {
                success: true,
                message: format!("Rule enabled: {id}"),
            };
            output(&out, json_mode);
        }

        RuleCommands::Disable { id } => {
            store.set_status(id, RuleStatus::Inactive).await?;
            let out = RuleActionOutput {
                success: true,
                message: format!("Rule disabled: {id}"),
            };
            output(&out, json_mode);
        }

        RuleCommands::Import { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let imports: Vec<RuleImport> =
                serde_yaml::from_str(&raw).context("Failed to parse rule definitions")?;

            let mut imported = 0;
            for import in imports {
                let rule = Rule::from(import);
                store.insert(&rule).await?;
                imported += 1;
            }

            let out = RuleActionOutput {
                success: true,
                message: format!("Imported {imported} rule(s) from {}", file.display()),
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
