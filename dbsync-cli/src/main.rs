//! dbsync CLI - Command-line interface for the dbsync merge engine.

use clap::Parser;

use dbsync_cli::cli::{Cli, Command};
use dbsync_cli::commands;
use dbsync_cli::error::CliResult;
use dbsync_cli::output;

#[tokio::main]
async fn main() {
    dbsync_merge::logging::init();

    if let Err(e) = run().await {
        output::newline();
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Diff(args) => commands::diff::run(args).await,
        Command::Apply(args) => commands::apply::run(args).await,
        Command::Validate(args) => commands::validate::run(args).await,
        Command::Version => commands::version::run().await,
    }
}
