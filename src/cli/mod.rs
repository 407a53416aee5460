//! Command-line interface for operating the rule engine.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "flywheel")]
#[command(about = "Flywheel - automation rule engine", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rule management commands
    Rule(commands::rule::RuleArgs),

    /// List the execution audit trail for a rule
    Executions(commands::executions::ExecutionsArgs),

    /// Execute a single trigger job from a JSON file
    Trigger(commands::trigger::TriggerArgs),

    /// Replay a JSONL stream of trigger jobs through the worker
    Run(commands::run::RunArgs),
}

/// Print a top-level error in the selected output mode and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) {
    if json_mode {
        let payload = serde_json::json!({"error": format!("{err:#}")});
        eprintln!("{}", serde_json::to_string_pretty(&payload).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
