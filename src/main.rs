//! Flywheel CLI entry point.

use clap::Parser;

use flywheel::cli::{Cli, Commands};
use flywheel::domain::models::LoggingConfig;

#[tokio::main]
async fn main() {
    // Logging is up before config loads so config errors are visible;
    // level/format come from RUST_LOG or the defaults.
    flywheel::infrastructure::logging::init(&LoggingConfig::default());

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Rule(args) => flywheel::cli::commands::rule::execute(args, cli.json).await,
        Commands::Executions(args) => {
            flywheel::cli::commands::executions::execute(args, cli.json).await
        }
        Commands::Trigger(args) => flywheel::cli::commands::trigger::execute(args, cli.json).await,
        Commands::Run(args) => flywheel::cli::commands::run::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        flywheel::cli::handle_error(err, cli.json);
    }
}
