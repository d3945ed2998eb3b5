//! Quill CLI - capture and search notes against a remote notes service
//!
//! Quick capture from the terminal with minimal friction; all note state
//! lives in the remote store.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;
#[cfg(test)]
mod tests;

use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::{
    run_add, run_auth, run_completions, run_config, run_delete, run_edit, run_list, run_search,
};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(()) => {}
        // Already surfaced through a toast; just exit non-zero.
        Err(CliError::Reported) => std::process::exit(1),
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quill=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Some(Commands::Add {
            content,
            tags,
            dictate,
        }) => run_add(&content, tags, dictate, profile).await,
        Some(Commands::List {
            page,
            page_size,
            json,
        }) => run_list(page, page_size, json, profile).await,
        Some(Commands::Search { query, json }) => run_search(&query, json, profile).await,
        Some(Commands::Edit { id, tags }) => run_edit(&id, tags, profile).await,
        Some(Commands::Delete { id }) => run_delete(&id, profile).await,
        Some(Commands::Auth { command }) => run_auth(command, profile).await,
        Some(Commands::Config { command }) => run_config(command, profile),
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())
        }
        None => {
            // Quick capture mode: quill "my note"
            if cli.note.is_empty() {
                Cli::command().print_help().map_err(CliError::Io)?;
                println!();
                Ok(())
            } else {
                run_add(&cli.note, Vec::new(), false, profile).await
            }
        }
    }
}
