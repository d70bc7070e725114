//! notesync CLI - keep notes locally and sync them as remote tasks

mod cli;
mod commands;
mod error;
mod settings;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::alert::run_alert;
use crate::commands::checklist::run_checklist;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::list::run_list;
use crate::commands::new::run_new;
use crate::commands::relocate::run_move;
use crate::commands::show::run_show;
use crate::commands::sync::run_sync;
use crate::error::CliError;
use crate::settings::Settings;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("notesync=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::resolve(cli.config, cli.db_path)?;
    let config = &settings.config;
    let db_path = settings.db_path();

    match cli.command {
        Some(Commands::New {
            content,
            folder,
            bg,
        }) => {
            run_new(&content, folder, bg, config, db_path)?;
        }
        Some(Commands::Show { id, json }) => run_show(&id, json, db_path)?,
        Some(Commands::Edit { id, content }) => run_edit(&id, &content, db_path)?,
        Some(Commands::List { folder, json }) => run_list(folder, json, db_path)?,
        Some(Commands::Delete { ids, purge }) => run_delete(&ids, purge, config, db_path)?,
        Some(Commands::Move { ids, to }) => run_move(&ids, to, db_path)?,
        Some(Commands::Alert { id, at, clear }) => run_alert(&id, at, clear, db_path)?,
        Some(Commands::Checklist { id, state }) => run_checklist(&id, state, db_path)?,
        Some(Commands::Sync { timeout }) => {
            run_sync(timeout, config, db_path).await?;
        }
        Some(Commands::Config { command }) => run_config(command, &settings)?,
        Some(Commands::Completions { shell, output }) => {
            run_completions(shell, output.as_deref())?;
        }
        None => {
            if cli.note.is_empty() {
                run_list(None, false, db_path)?;
            } else {
                run_new(&cli.note, None, None, config, db_path)?;
            }
        }
    }

    Ok(())
}
