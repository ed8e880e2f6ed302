//! Chordbook CLI - chord charts and set-lists from the command line
//!
//! Edits land in a local libSQL database; `chordbook sync` reconciles them
//! with a folder shared between devices.

mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::filter::Directive;

use crate::cli::{Cli, Commands};
use crate::commands::chart::run_chart;
use crate::commands::common::resolve_db_path;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::remote::run_remote;
use crate::commands::setlist::run_set_list;
use crate::commands::sync::run_sync_command;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "chordbook=info".parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path);

    match cli.command {
        Commands::Chart { command } => run_chart(command, &db_path).await,
        Commands::SetList { command } => run_set_list(command, &db_path).await,
        Commands::Sync { yes, command } => run_sync_command(command, yes, &db_path).await,
        Commands::Remote { command } => run_remote(command, &db_path).await,
        Commands::Config { command } => run_config(command, &db_path).await,
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref()),
    }
}
